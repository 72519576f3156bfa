//! View state for the onboarding wizard and the dashboard.
//!
//! Nothing in here renders; these types hold what the screens show and
//! decide what gets persisted or sent to the generate endpoint.

pub mod dashboard;
pub mod wizard;

use crate::models::UserProfile;

pub const INDUSTRIES: [&str; 8] = [
    "Food & Beverage",
    "Fashion & Beauty",
    "Health & Fitness",
    "Technology & Software",
    "Retail & E-commerce",
    "Education & Coaching",
    "Entertainment & Media",
    OTHER,
];

pub const GOALS: [&str; 6] = [
    "Build brand awareness",
    "Drive sales or leads",
    "Showcase products/services",
    "Educate or share expertise",
    "Build community & engagement",
    OTHER,
];

pub const PERSONALITIES: [&str; 8] = [
    "Professional",
    "Friendly",
    "Playful",
    "Bold",
    "Minimalist",
    "Elegant",
    "Innovative",
    "Fun & quirky",
];

pub const VISUAL_STYLES: [&str; 5] = [
    "Clean & minimalist",
    "Vibrant & energetic",
    "Modern & techy",
    "Elegant & premium",
    "Fun & creative",
];

pub const TARGET_AUDIENCES: [&str; 8] = [
    "Gen Z (under 25)",
    "Millennials (25–40)",
    "Gen X (40–55)",
    "Parents & families",
    "Small business owners",
    "Professionals & executives",
    "Fitness/wellness enthusiasts",
    OTHER,
];

pub const POST_TYPES: [&str; 7] = [
    "Product highlights",
    "Promotions/discounts",
    "Tips & educational posts",
    "Lifestyle/inspirational",
    "Behind-the-scenes",
    "Quotes & mottos",
    "Memes & fun posts",
];

pub const PREDEFINED_COLORS: [&str; 25] = [
    "#FF6B6B", "#4ECDC4", "#45B7D1", "#96CEB4", "#FFEAA7", "#DDA0DD", "#98D8C8", "#F7DC6F",
    "#BB8FCE", "#85C1E9", "#F8C471", "#82E0AA", "#F1948A", "#85C1E9", "#D7BDE2", "#A3E4D7",
    "#F9E79F", "#FADBD8", "#D5DBDB", "#2C3E50", "#E74C3C", "#3498DB", "#2ECC71", "#F39C12",
    "#9B59B6",
];

pub const OTHER: &str = "Other";
pub const MAX_PERSONALITIES: usize = 3;
pub const MAX_POST_TYPES: usize = 3;
pub const MAX_BRAND_COLORS: usize = 5;

/// Free text typed next to an "Other" choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtherField {
    Industry,
    Goal,
    TargetAudience,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OtherInputs {
    pub industry: String,
    pub goal: String,
    pub target_audience: String,
}

/// Removes `value` if present, otherwise adds it while under `limit`.
fn toggle_limited(values: &mut Vec<String>, value: &str, limit: Option<usize>) {
    if let Some(index) = values.iter().position(|existing| existing == value) {
        values.remove(index);
    } else if limit.map_or(true, |limit| values.len() < limit) {
        values.push(value.to_string());
    }
}

/// Selection rules shared by the wizard form and the profile editor.
impl UserProfile {
    pub fn toggle_personality(&mut self, personality: &str) {
        toggle_limited(
            &mut self.brand_personality,
            personality,
            Some(MAX_PERSONALITIES),
        );
    }

    pub fn toggle_post_type(&mut self, post_type: &str) {
        toggle_limited(&mut self.post_types, post_type, Some(MAX_POST_TYPES));
    }

    pub fn toggle_target_audience(&mut self, audience: &str) {
        toggle_limited(&mut self.target_audience, audience, None);
    }

    pub fn toggle_brand_color(&mut self, color: &str) {
        toggle_limited(&mut self.brand_colors, color, Some(MAX_BRAND_COLORS));
    }

    /// Adds a picked color unless blank, already chosen, or over the limit.
    pub fn add_custom_color(&mut self, color: &str) -> bool {
        let color = color.trim();
        if color.is_empty()
            || self.brand_colors.iter().any(|existing| existing == color)
            || self.brand_colors.len() >= MAX_BRAND_COLORS
        {
            return false;
        }
        self.brand_colors.push(color.to_string());
        true
    }

    pub fn remove_brand_color(&mut self, color: &str) {
        self.brand_colors.retain(|existing| existing != color);
    }

    /// Applies "Other" free text. For the audience, the typed value takes
    /// the place of the "Other" tag or of the previously typed value.
    pub fn apply_other_input(&mut self, inputs: &mut OtherInputs, field: OtherField, value: &str) {
        match field {
            OtherField::Industry => {
                inputs.industry = value.to_string();
                self.industry = value.to_string();
            }
            OtherField::Goal => {
                inputs.goal = value.to_string();
                self.goal = value.to_string();
            }
            OtherField::TargetAudience => {
                let previous = std::mem::replace(&mut inputs.target_audience, value.to_string());
                let replacement = if value.trim().is_empty() {
                    OTHER.to_string()
                } else {
                    value.to_string()
                };

                let slot = self.target_audience.iter().position(|existing| {
                    existing == OTHER || (!previous.is_empty() && *existing == previous)
                });
                match slot {
                    Some(index) => self.target_audience[index] = replacement,
                    None => self.target_audience.push(replacement),
                }
            }
        }
    }

    /// Stores the logo as a data URL, the form it is later sent in.
    pub fn set_logo(&mut self, mime_type: &str, data_b64: &str) {
        self.logo = Some(llmapi::utils::to_data_url(mime_type, data_b64));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn personality_selection_is_capped_at_three() {
        let mut profile = UserProfile::default();
        for personality in PERSONALITIES.iter().take(4) {
            profile.toggle_personality(personality);
        }
        assert_eq!(profile.brand_personality, vec!["Professional", "Friendly", "Playful"]);

        profile.toggle_personality("Friendly");
        profile.toggle_personality("Bold");
        assert_eq!(profile.brand_personality, vec!["Professional", "Playful", "Bold"]);
    }

    #[test]
    fn brand_colors_are_capped_at_five() {
        let mut profile = UserProfile::default();
        for color in PREDEFINED_COLORS.iter().take(6) {
            profile.toggle_brand_color(color);
        }
        assert_eq!(profile.brand_colors.len(), MAX_BRAND_COLORS);
        assert!(!profile.add_custom_color("#000000"));

        profile.remove_brand_color("#FF6B6B");
        assert!(!profile.add_custom_color("#4ECDC4"));
        assert!(!profile.add_custom_color("  "));
        assert!(profile.add_custom_color("#000000"));
    }

    #[test]
    fn audience_other_text_replaces_tag_and_itself() {
        let mut profile = UserProfile::default();
        let mut inputs = OtherInputs::default();
        profile.toggle_target_audience("Parents & families");
        profile.toggle_target_audience(OTHER);

        profile.apply_other_input(&mut inputs, OtherField::TargetAudience, "Stud");
        profile.apply_other_input(&mut inputs, OtherField::TargetAudience, "Students");
        assert_eq!(profile.target_audience, vec!["Parents & families", "Students"]);

        profile.apply_other_input(&mut inputs, OtherField::TargetAudience, "");
        assert_eq!(profile.target_audience, vec!["Parents & families", OTHER]);
    }

    #[test]
    fn other_industry_text_becomes_the_industry() {
        let mut profile = UserProfile::default();
        let mut inputs = OtherInputs::default();
        profile.apply_other_input(&mut inputs, OtherField::Industry, "Pet grooming");
        assert_eq!(profile.industry, "Pet grooming");
        assert_eq!(inputs.industry, "Pet grooming");
    }

    #[test]
    fn logo_is_kept_as_data_url() {
        let mut profile = UserProfile::default();
        profile.set_logo("image/png", "TE9HTw==");
        assert_eq!(profile.logo.as_deref(), Some("data:image/png;base64,TE9HTw=="));
    }
}
