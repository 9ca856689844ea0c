//! Rating fields decoded from the `window.appCache` script payload.
//!
//! Aggregate and per-review sub-ratings are not reliably present as visible
//! text, so they are pulled out of the embedded JSON by field name.

use regex::Regex;
use std::sync::LazyLock;

pub use crate::records::OverallRatings;

/// Per-review sub-rating field names, in output column order
pub const SUB_RATING_FIELDS: [&str; 6] = [
    "ratingWorkLifeBalance",
    "ratingCultureAndValues",
    "ratingDiversityAndInclusion",
    "ratingSeniorLeadership",
    "ratingCareerOpportunities",
    "ratingCompensationAndBenefits",
];

/// Company aggregate field names, in output column order
pub const OVERALL_FIELDS: [&str; 11] = [
    "overallRating",
    "reviewCount",
    "recommendToFriendRating",
    "ceoRating",
    "businessOutlookRating",
    "cultureAndValuesRating",
    "diversityAndInclusionRating",
    "careerOpportunitiesRating",
    "workLifeBalanceRating",
    "seniorManagementRating",
    "compensationAndBenefitsRating",
];

static SUB_RATING: LazyLock<Regex> = LazyLock::new(|| {
    let names = SUB_RATING_FIELDS.join("|");
    Regex::new(&format!(r#""({names})":(\d+)"#)).expect("sub-rating pattern should be valid")
});

static OVERALL: LazyLock<Regex> = LazyLock::new(|| {
    let names = OVERALL_FIELDS.join("|");
    Regex::new(&format!(r#""({names})":(\d+(?:\.\d+)?)"#)).expect("overall pattern should be valid")
});

/// Sub-ratings in payload order, one entry per review that carries the field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubRatings {
    pub work_life_balance: Vec<u8>,
    pub culture_and_values: Vec<u8>,
    pub diversity_and_inclusion: Vec<u8>,
    pub senior_leadership: Vec<u8>,
    pub career_opportunities: Vec<u8>,
    pub compensation_and_benefits: Vec<u8>,
}

impl SubRatings {
    fn column_mut(&mut self, field: &str) -> Option<&mut Vec<u8>> {
        match field {
            "ratingWorkLifeBalance" => Some(&mut self.work_life_balance),
            "ratingCultureAndValues" => Some(&mut self.culture_and_values),
            "ratingDiversityAndInclusion" => Some(&mut self.diversity_and_inclusion),
            "ratingSeniorLeadership" => Some(&mut self.senior_leadership),
            "ratingCareerOpportunities" => Some(&mut self.career_opportunities),
            "ratingCompensationAndBenefits" => Some(&mut self.compensation_and_benefits),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.work_life_balance.is_empty()
            && self.culture_and_values.is_empty()
            && self.diversity_and_inclusion.is_empty()
            && self.senior_leadership.is_empty()
            && self.career_opportunities.is_empty()
            && self.compensation_and_benefits.is_empty()
    }
}

/// Collect every per-review sub-rating in the payload
pub fn sub_ratings(script: &str) -> SubRatings {
    let mut ratings = SubRatings::default();
    for caps in SUB_RATING.captures_iter(script) {
        let Ok(value) = caps[2].parse::<u8>() else {
            continue;
        };
        if let Some(column) = ratings.column_mut(&caps[1]) {
            column.push(value);
        }
    }
    ratings
}

/// Company aggregate ratings; a field repeated in the payload keeps its last value
pub fn overall_ratings(script: &str) -> OverallRatings {
    let mut ratings = OverallRatings::default();
    for caps in OVERALL.captures_iter(script) {
        let value = Some(caps[2].to_string());
        match &caps[1] {
            "overallRating" => ratings.overall_rating = value,
            "reviewCount" => ratings.review_count = value,
            "recommendToFriendRating" => ratings.recommend_to_friend_rating = value,
            "ceoRating" => ratings.ceo_rating = value,
            "businessOutlookRating" => ratings.business_outlook_rating = value,
            "cultureAndValuesRating" => ratings.culture_and_values_rating = value,
            "diversityAndInclusionRating" => ratings.diversity_and_inclusion_rating = value,
            "careerOpportunitiesRating" => ratings.career_opportunities_rating = value,
            "workLifeBalanceRating" => ratings.work_life_balance_rating = value,
            "seniorManagementRating" => ratings.senior_management_rating = value,
            "compensationAndBenefitsRating" => ratings.compensation_and_benefits_rating = value,
            _ => {}
        }
    }
    ratings
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = r#"window.appCache={"reviews":[
        {"reviewId":1,"ratingWorkLifeBalance":4,"ratingCultureAndValues":5,"ratingCareerOpportunities":3},
        {"reviewId":2,"ratingWorkLifeBalance":2,"ratingSeniorLeadership":1,"ratingCompensationAndBenefits":5}
    ],"ratings":{"overallRating":4.1,"reviewCount":1234,"ceoRating":0.87,"overallRating":4.2}}"#;

    #[test]
    fn test_sub_ratings_keep_payload_order() {
        let ratings = sub_ratings(PAYLOAD);
        assert_eq!(ratings.work_life_balance, vec![4, 2]);
        assert_eq!(ratings.culture_and_values, vec![5]);
        assert_eq!(ratings.senior_leadership, vec![1]);
        assert_eq!(ratings.career_opportunities, vec![3]);
        assert_eq!(ratings.compensation_and_benefits, vec![5]);
        assert!(ratings.diversity_and_inclusion.is_empty());
    }

    #[test]
    fn test_overall_ratings_last_value_wins() {
        let ratings = overall_ratings(PAYLOAD);
        assert_eq!(ratings.overall_rating.as_deref(), Some("4.2"));
        assert_eq!(ratings.review_count.as_deref(), Some("1234"));
        assert_eq!(ratings.ceo_rating.as_deref(), Some("0.87"));
        assert_eq!(ratings.work_life_balance_rating, None);
    }

    #[test]
    fn test_empty_payload() {
        assert!(sub_ratings("").is_empty());
        assert_eq!(overall_ratings(""), OverallRatings::default());
    }

    #[test]
    fn test_non_numeric_values_are_ignored() {
        let ratings = sub_ratings(r#"{"ratingWorkLifeBalance":null,"ratingCultureAndValues":"4"}"#);
        assert!(ratings.is_empty());
    }
}
