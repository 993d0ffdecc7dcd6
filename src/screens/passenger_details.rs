//! Rider details and stop selection for one booking.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::context::AppContext;
use crate::models::{PassengerDetails, Route, SubscriptionTerms};
use crate::navigation::{Completion, NavIntent, Slots};
use crate::screens::{require, FieldErrors, Step};
use crate::utils::{pricing, stops};

/// Fields the rider fills in. Name and e-mail come from the profile.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PassengerInput {
    #[serde(default)]
    pub age: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub boarding_point: String,
    #[serde(default)]
    pub deboarding_point: String,
    #[serde(default)]
    pub subscribe_to_updates: bool,
    #[serde(default = "default_alerts")]
    pub receive_alerts: bool,
}

fn default_alerts() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PassengerAction {
    Change(PassengerInput),
    Submit(PassengerInput),
}

#[derive(Debug, Clone, Serialize)]
pub struct PassengerDetailsScreen {
    pub route: Route,
    pub date: Option<NaiveDate>,
    pub subscription: Option<SubscriptionTerms>,
    pub details: PassengerDetails,
    pub boarding_options: Vec<String>,
    pub deboarding_options: Vec<String>,
    pub total_fare: i64,
    pub errors: FieldErrors,
}

impl PassengerDetailsScreen {
    /// `None` without a selected route.
    pub fn new(slots: &Slots, ctx: &AppContext) -> Option<Self> {
        let route = slots.route.clone()?;
        let stop_list = route.stop_list();
        let profile = ctx.profile();
        let total_fare = match slots.subscription {
            Some(terms) => pricing::weekly_subscription_fare(route.price, terms.duration_weeks).total,
            None => pricing::single_fare(route.price),
        };

        Some(Self {
            date: slots.date,
            subscription: slots.subscription,
            details: PassengerDetails {
                name: profile.full_name.clone(),
                email: profile.email.clone(),
                phone_number: profile.phone_number.clone(),
                receive_alerts: true,
                ..Default::default()
            },
            boarding_options: stops::boarding_options(&stop_list),
            deboarding_options: stops::deboarding_options(&stop_list),
            total_fare,
            errors: FieldErrors::new(),
            route,
        })
    }

    fn apply(&mut self, input: PassengerInput) {
        self.details.age = input.age;
        self.details.gender = input.gender;
        self.details.phone_number = input.phone_number;
        self.details.boarding_point = input.boarding_point;
        self.details.deboarding_point = input.deboarding_point;
        self.details.subscribe_to_updates = input.subscribe_to_updates;
        self.details.receive_alerts = input.receive_alerts;
    }

    fn validate(&self) -> FieldErrors {
        let d = &self.details;
        let mut errors = FieldErrors::new();

        require(&mut errors, "name", &d.name, "Name is required");
        require(&mut errors, "email", &d.email, "Email is required");
        require(&mut errors, "phone_number", &d.phone_number, "Phone number is required");
        require(&mut errors, "gender", &d.gender, "Gender is required");

        if require(&mut errors, "age", &d.age, "Age is required") {
            match d.age.trim().parse::<i32>() {
                Ok(age) if (1..=120).contains(&age) => {}
                _ => {
                    errors.insert("age", "Please enter a valid age".to_string());
                }
            }
        }

        if require(&mut errors, "boarding_point", &d.boarding_point, "Choose a boarding point")
            && !self.boarding_options.contains(&d.boarding_point)
        {
            errors.insert("boarding_point", "Boarding point is not on this route".to_string());
        }

        if require(&mut errors, "deboarding_point", &d.deboarding_point, "Choose a deboarding point")
            && !self.deboarding_options.contains(&d.deboarding_point)
        {
            errors.insert("deboarding_point", "Deboarding point is not on this route".to_string());
        }

        errors
    }

    pub fn update(&mut self, action: PassengerAction) -> Step {
        match action {
            PassengerAction::Change(input) => {
                self.apply(input);
                Step::None
            }
            PassengerAction::Submit(input) => {
                self.apply(input);
                self.errors = self.validate();
                if !self.errors.is_empty() {
                    tracing::debug!(fields = ?self.errors.keys().collect::<Vec<_>>(), "Passenger details incomplete");
                    return Step::None;
                }
                Step::Intent(NavIntent::Complete(Completion::PassengerDetails(self.details.clone())))
            }
        }
    }
}
