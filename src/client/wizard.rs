use crate::client::{OtherField, OtherInputs};
use crate::commands::profile::save_profile;
use crate::models::UserProfile;
use crate::store::{LocalStore, StoreResult};

pub const FIRST_STEP: u8 = 1;
pub const LAST_STEP: u8 = 9;

/// Nine-step onboarding form. Each step has one predicate that must hold
/// before moving on.
#[derive(Debug, Clone, PartialEq)]
pub struct OnboardingWizard {
    step: u8,
    form: UserProfile,
    other_inputs: OtherInputs,
}

impl Default for OnboardingWizard {
    fn default() -> Self {
        Self {
            step: FIRST_STEP,
            form: UserProfile::default(),
            other_inputs: OtherInputs::default(),
        }
    }
}

impl OnboardingWizard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> u8 {
        self.step
    }

    pub fn form(&self) -> &UserProfile {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut UserProfile {
        &mut self.form
    }

    pub fn other_inputs(&self) -> &OtherInputs {
        &self.other_inputs
    }

    pub fn set_other_input(&mut self, field: OtherField, value: &str) {
        self.form
            .apply_other_input(&mut self.other_inputs, field, value);
    }

    pub fn can_proceed(&self) -> bool {
        let form = &self.form;
        match self.step {
            1 => !form.name.trim().is_empty(),
            2 => !form.industry.is_empty(),
            3 => !form.goal.is_empty(),
            4 => !form.brand_personality.is_empty(),
            5 => !form.target_audience.is_empty(),
            6 => !form.post_types.is_empty(),
            7 => !form.visual_style.is_empty(),
            8 => !form.brand_colors.is_empty(),
            9 => !form.business_description.trim().is_empty(),
            _ => false,
        }
    }

    /// Moves forward when the current step is complete. Returns whether the
    /// step changed.
    pub fn next(&mut self) -> bool {
        if self.step < LAST_STEP && self.can_proceed() {
            self.step += 1;
            true
        } else {
            false
        }
    }

    pub fn back(&mut self) -> bool {
        if self.step > FIRST_STEP {
            self.step -= 1;
            true
        } else {
            false
        }
    }

    pub fn is_last_step(&self) -> bool {
        self.step == LAST_STEP
    }

    /// Finishes onboarding: stamps `completedAt`, replaces the stored
    /// profile and resets the wizard. `None` when the last step is not
    /// complete yet.
    pub fn submit<S: LocalStore + ?Sized>(
        &mut self,
        store: &mut S,
    ) -> StoreResult<Option<UserProfile>> {
        if !self.is_last_step() || !self.can_proceed() {
            return Ok(None);
        }

        let mut profile = self.form.clone();
        profile.completed_at =
            chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
        save_profile(store, &profile)?;

        *self = Self::default();
        Ok(Some(profile))
    }
}
