//! The three checkout screens: single trip (or a pass booked through
//! passenger details), subscription plan and multi-day booking.
//!
//! They share one shape. A fare summary, a method choice that is purely a
//! display choice, and a confirm action that is ignored while a payment is
//! already being processed.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::effects::{Effect, Outcome};
use crate::models::{BankDetails, BookingDetails, HybridBooking, PaymentMethod, SubscriptionQuote, BANK_DETAILS};
use crate::navigation::{Completion, NavIntent};
use crate::screens::{Banner, Step};
use crate::utils::pricing::{self, FareBreakdown};

#[derive(Debug, Clone, Copy, Serialize)]
pub struct MethodOption {
    pub method: PaymentMethod,
    pub name: &'static str,
    pub description: &'static str,
}

pub const PAYMENT_METHODS: [MethodOption; 3] = [
    MethodOption {
        method: PaymentMethod::Card,
        name: "Credit/Debit Card",
        description: "Visa, Mastercard",
    },
    MethodOption {
        method: PaymentMethod::Wallet,
        name: "Digital Wallet",
        description: "Quick payment",
    },
    MethodOption {
        method: PaymentMethod::Transfer,
        name: "Bank Transfer",
        description: "Direct bank transfer",
    },
];

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PaymentAction {
    SelectMethod { method: PaymentMethod },
    Confirm,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryLine {
    pub label: &'static str,
    pub value: String,
}

fn line(label: &'static str, value: impl Into<String>) -> SummaryLine {
    SummaryLine {
        label,
        value: value.into(),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentView {
    pub title: &'static str,
    pub summary: Vec<SummaryLine>,
    pub fare: FareBreakdown,
    pub savings: i64,
    pub methods: &'static [MethodOption],
    pub method: PaymentMethod,
    pub processing: bool,
    /// Present while bank transfer is selected.
    pub bank_details: Option<BankDetails>,
    pub reference: Option<String>,
    pub banner: Banner,
}

/// Method choice and the in-flight guard shared by every checkout.
#[derive(Debug, Clone)]
struct Checkout {
    method: PaymentMethod,
    processing: bool,
    reference: String,
    banner: Banner,
}

impl Checkout {
    fn new(reference: String) -> Self {
        Self {
            method: PaymentMethod::default(),
            processing: false,
            reference,
            banner: Banner::default(),
        }
    }

    /// Handles method changes; returns true when a confirm should go ahead.
    fn accept(&mut self, action: PaymentAction) -> bool {
        match action {
            PaymentAction::SelectMethod { method } => {
                if !self.processing {
                    self.method = method;
                }
                false
            }
            PaymentAction::Confirm => {
                if self.processing {
                    tracing::debug!("Payment already in progress");
                    return false;
                }
                self.processing = true;
                self.banner.clear();
                true
            }
        }
    }

    fn failed(&mut self, message: String) -> Step {
        self.processing = false;
        self.banner.error(message);
        Step::None
    }

    fn view(&self, title: &'static str, summary: Vec<SummaryLine>, fare: FareBreakdown) -> PaymentView {
        let transfer = self.method == PaymentMethod::Transfer;
        PaymentView {
            title,
            summary,
            savings: fare.savings(),
            fare,
            methods: &PAYMENT_METHODS,
            method: self.method,
            processing: self.processing,
            bank_details: transfer.then_some(BANK_DETAILS),
            reference: transfer.then(|| self.reference.clone()),
            banner: self.banner.clone(),
        }
    }
}

/// Last six digits of the current millisecond clock.
fn reference_suffix() -> String {
    let millis = Utc::now().timestamp_millis().to_string();
    millis[millis.len().saturating_sub(6)..].to_string()
}

#[derive(Debug, Clone)]
pub struct PaymentScreen {
    booking: BookingDetails,
    checkout: Checkout,
}

impl PaymentScreen {
    pub fn new(booking: BookingDetails) -> Self {
        let reference = if booking.is_subscription() {
            format!("SUB-{}", booking.route.label().replace(' ', ""))
        } else {
            format!("MB-{}", reference_suffix())
        };
        Self {
            booking,
            checkout: Checkout::new(reference),
        }
    }

    pub fn update(&mut self, action: PaymentAction) -> Step {
        if self.checkout.accept(action) {
            Step::Effect(Effect::PayBooking(self.booking.clone()))
        } else {
            Step::None
        }
    }

    pub fn on_outcome(&mut self, outcome: Outcome) -> Step {
        match outcome {
            Outcome::Paid(receipt) => {
                self.checkout.processing = false;
                Step::Intent(NavIntent::Complete(Completion::Payment(receipt)))
            }
            Outcome::Failed(message) => self.checkout.failed(message),
            _ => Step::None,
        }
    }

    pub fn view(&self) -> PaymentView {
        let b = &self.booking;
        let mut summary = vec![
            line("Route", b.route.label()),
            line("Passenger", b.passenger.name.clone()),
            line("Boarding", b.boarding_point.clone()),
            line("Deboarding", b.deboarding_point.clone()),
        ];
        let fare = match b.subscription {
            Some(terms) => {
                summary.push(line("Plan", format!("{} week(s), Monday to Friday", terms.duration_weeks)));
                summary.push(line("Starts", terms.start_date.to_string()));
                summary.push(line("Ends", terms.end_date.to_string()));
                pricing::weekly_subscription_fare(b.route.price, terms.duration_weeks)
            }
            None => {
                summary.push(line("Date", b.date.to_string()));
                summary.push(line("Departure", b.route.departure_time.clone()));
                FareBreakdown::flat(b.total_fare)
            }
        };
        let title = if b.is_subscription() {
            "Subscription Payment"
        } else {
            "Payment"
        };
        self.checkout.view(title, summary, fare)
    }
}

#[derive(Debug, Clone)]
pub struct SubscriptionPaymentScreen {
    quote: SubscriptionQuote,
    checkout: Checkout,
}

impl SubscriptionPaymentScreen {
    pub fn new(quote: SubscriptionQuote) -> Self {
        let reference = format!("SUB-{}", quote.route.label().replace(' ', ""));
        Self {
            quote,
            checkout: Checkout::new(reference),
        }
    }

    pub fn update(&mut self, action: PaymentAction) -> Step {
        if self.checkout.accept(action) {
            Step::Effect(Effect::PaySubscription(self.quote.clone()))
        } else {
            Step::None
        }
    }

    pub fn on_outcome(&mut self, outcome: Outcome) -> Step {
        match outcome {
            Outcome::Subscribed(subscription) => {
                self.checkout.processing = false;
                Step::Intent(NavIntent::Complete(Completion::SubscriptionPayment(subscription)))
            }
            Outcome::Failed(message) => self.checkout.failed(message),
            _ => Step::None,
        }
    }

    pub fn view(&self) -> PaymentView {
        let summary = vec![
            line("Route", self.quote.route.label()),
            line("Plan", self.quote.plan.description()),
            line("Weeks covered", self.quote.duration_weeks().to_string()),
        ];
        self.checkout.view("Subscription Payment", summary, self.quote.fare)
    }
}

#[derive(Debug, Clone)]
pub struct HybridPaymentScreen {
    booking: HybridBooking,
    checkout: Checkout,
}

impl HybridPaymentScreen {
    pub fn new(booking: HybridBooking) -> Self {
        Self {
            booking,
            checkout: Checkout::new(format!("HYBRID-{}", reference_suffix())),
        }
    }

    pub fn update(&mut self, action: PaymentAction) -> Step {
        if self.checkout.accept(action) {
            Step::Effect(Effect::PayHybrid(self.booking.clone()))
        } else {
            Step::None
        }
    }

    pub fn on_outcome(&mut self, outcome: Outcome) -> Step {
        match outcome {
            Outcome::HybridPaid(tickets) => {
                self.checkout.processing = false;
                Step::Intent(NavIntent::Complete(Completion::HybridPayment(tickets)))
            }
            Outcome::Failed(message) => self.checkout.failed(message),
            _ => Step::None,
        }
    }

    pub fn view(&self) -> PaymentView {
        let b = &self.booking;
        let dates = b
            .dates
            .iter()
            .map(|d| d.format("%a %d %b").to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let summary = vec![
            line("Route", b.route.label()),
            line("Boarding", b.boarding_point.clone()),
            line("Deboarding", b.deboarding_point.clone()),
            line("Travel days", format!("{} ({})", b.dates.len(), dates)),
        ];
        self.checkout.view("Hybrid Payment", summary, b.fare)
    }
}
