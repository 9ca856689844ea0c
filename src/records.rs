use serde::{Deserialize, Serialize};

/// Placeholder written when an interview lists no questions
pub const NOT_PROVIDED: &str = "Not Provided";

/// Per-company output files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFile {
    OverallReviews,
    Reviews,
    Salaries,
    Interviews,
    Benefits,
    Diversity,
}

impl OutputFile {
    pub fn file_name(&self) -> &'static str {
        match self {
            OutputFile::OverallReviews => "OverallReviews.csv",
            OutputFile::Reviews => "reviews.csv",
            OutputFile::Salaries => "salaries.csv",
            OutputFile::Interviews => "interviews.csv",
            OutputFile::Benefits => "benefits.csv",
            OutputFile::Diversity => "diversity.csv",
        }
    }

    /// Header row, in the column order records serialize in
    pub fn headers(&self) -> &'static [&'static str] {
        match self {
            OutputFile::OverallReviews => &[
                "overall_rating",
                "review_count",
                "recommend_to_friend_rating",
                "ceo_rating",
                "business_outlook_rating",
                "culture_and_values_rating",
                "diversity_and_inclusion_rating",
                "career_opportunities_rating",
                "work_life_balance_rating",
                "senior_management_rating",
                "compensation_and_benefits_rating",
            ],
            OutputFile::Reviews => &[
                "Rating",
                "Title",
                "Date",
                "Employee",
                "EmployeeDetails",
                "Location",
                "Recommend",
                "CEO Approval",
                "Business Outlook",
                "Pro",
                "Con",
                "ratingWorkLifeBalance",
                "ratingCultureAndValues",
                "ratingDiversityAndInclusion",
                "ratingSeniorLeadership",
                "ratingCareerOpportunities",
                "ratingCompensationAndBenefits",
            ],
            OutputFile::Salaries => &["Job Title", "Total Pay", "Base", "Additional"],
            OutputFile::Interviews => &[
                "Interview Title",
                "Application",
                "Interview",
                "Interview Question",
            ],
            OutputFile::Benefits => &["Employment Status", "Rating", "Number of Ratings"],
            OutputFile::Diversity => &[
                "Rating Title",
                "Overall Rating",
                "Recommend to a Friend",
                "Approve of CEO",
                "Positive Business Outlook",
                "Career Opportunities",
                "Compensation and Benefits",
                "Culture & Values",
                "Diversity & Inclusion",
                "Senior Management",
                "Work/Life Balance",
            ],
        }
    }
}

/// A row type bound to the file it is written to
pub trait Record: Serialize {
    const FILE: OutputFile;
}

/// Company-wide aggregate ratings from the review page payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverallRatings {
    pub overall_rating: Option<String>,
    pub review_count: Option<String>,
    pub recommend_to_friend_rating: Option<String>,
    pub ceo_rating: Option<String>,
    pub business_outlook_rating: Option<String>,
    pub culture_and_values_rating: Option<String>,
    pub diversity_and_inclusion_rating: Option<String>,
    pub career_opportunities_rating: Option<String>,
    pub work_life_balance_rating: Option<String>,
    pub senior_management_rating: Option<String>,
    pub compensation_and_benefits_rating: Option<String>,
}

impl Record for OverallRatings {
    const FILE: OutputFile = OutputFile::OverallReviews;
}

/// Reviewer stance shown as an icon next to a review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sentiment {
    Approve,
    Disapprove,
    #[serde(rename = "No Opinion")]
    NoOpinion,
    #[serde(rename = "N/A")]
    NotApplicable,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    #[serde(rename = "Rating")]
    pub rating: Option<String>,
    #[serde(rename = "Title")]
    pub title: Option<String>,
    #[serde(rename = "Date")]
    pub date: Option<String>,
    #[serde(rename = "Employee")]
    pub employee: Option<String>,
    #[serde(rename = "EmployeeDetails")]
    pub employee_details: Option<String>,
    #[serde(rename = "Location")]
    pub location: Option<String>,
    #[serde(rename = "Recommend")]
    pub recommend: Option<Sentiment>,
    #[serde(rename = "CEO Approval")]
    pub ceo_approval: Option<Sentiment>,
    #[serde(rename = "Business Outlook")]
    pub business_outlook: Option<Sentiment>,
    #[serde(rename = "Pro")]
    pub pro: Option<String>,
    #[serde(rename = "Con")]
    pub con: Option<String>,
    #[serde(rename = "ratingWorkLifeBalance")]
    pub work_life_balance: Option<u8>,
    #[serde(rename = "ratingCultureAndValues")]
    pub culture_and_values: Option<u8>,
    #[serde(rename = "ratingDiversityAndInclusion")]
    pub diversity_and_inclusion: Option<u8>,
    #[serde(rename = "ratingSeniorLeadership")]
    pub senior_leadership: Option<u8>,
    #[serde(rename = "ratingCareerOpportunities")]
    pub career_opportunities: Option<u8>,
    #[serde(rename = "ratingCompensationAndBenefits")]
    pub compensation_and_benefits: Option<u8>,
}

impl Record for ReviewRecord {
    const FILE: OutputFile = OutputFile::Reviews;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalaryRecord {
    #[serde(rename = "Job Title")]
    pub job_title: Option<String>,
    #[serde(rename = "Total Pay")]
    pub total_pay: Option<String>,
    #[serde(rename = "Base")]
    pub base: Option<String>,
    #[serde(rename = "Additional")]
    pub additional: Option<String>,
}

impl Record for SalaryRecord {
    const FILE: OutputFile = OutputFile::Salaries;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewRecord {
    #[serde(rename = "Interview Title")]
    pub title: Option<String>,
    #[serde(rename = "Application")]
    pub application: Option<String>,
    #[serde(rename = "Interview")]
    pub interview: Option<String>,
    /// Question text, or [`NOT_PROVIDED`]
    #[serde(rename = "Interview Question")]
    pub question: String,
}

impl Record for InterviewRecord {
    const FILE: OutputFile = OutputFile::Interviews;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BenefitRecord {
    #[serde(rename = "Employment Status")]
    pub employment_status: Option<String>,
    #[serde(rename = "Rating")]
    pub rating: Option<String>,
    #[serde(rename = "Number of Ratings")]
    pub number_of_ratings: Option<String>,
}

impl Record for BenefitRecord {
    const FILE: OutputFile = OutputFile::Benefits;
}

/// One demographic breakdown read from the diversity modal
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiversityRecord {
    #[serde(rename = "Rating Title")]
    pub title: Option<String>,
    #[serde(rename = "Overall Rating")]
    pub overall_rating: Option<String>,
    #[serde(rename = "Recommend to a Friend")]
    pub recommend_to_friend: Option<String>,
    #[serde(rename = "Approve of CEO")]
    pub approve_of_ceo: Option<String>,
    #[serde(rename = "Positive Business Outlook")]
    pub positive_business_outlook: Option<String>,
    #[serde(rename = "Career Opportunities")]
    pub career_opportunities: Option<String>,
    #[serde(rename = "Compensation and Benefits")]
    pub compensation_and_benefits: Option<String>,
    #[serde(rename = "Culture & Values")]
    pub culture_and_values: Option<String>,
    #[serde(rename = "Diversity & Inclusion")]
    pub diversity_and_inclusion: Option<String>,
    #[serde(rename = "Senior Management")]
    pub senior_management: Option<String>,
    #[serde(rename = "Work/Life Balance")]
    pub work_life_balance: Option<String>,
}

impl DiversityRecord {
    /// Assemble a record from the modal's title, star rating, percentage
    /// gauges (recommend, CEO, outlook) and rating bars, in page order
    pub fn from_modal(
        title: Option<String>,
        overall_rating: Option<String>,
        percentages: &[String],
        ratings: &[String],
    ) -> Self {
        let pct = |i: usize| percentages.get(i).map(|p| format!("{p}%"));
        let bar = |i: usize| ratings.get(i).cloned();
        Self {
            title,
            overall_rating,
            recommend_to_friend: pct(0),
            approve_of_ceo: pct(1),
            positive_business_outlook: pct(2),
            career_opportunities: bar(0),
            compensation_and_benefits: bar(1),
            culture_and_values: bar(2),
            diversity_and_inclusion: bar(3),
            senior_management: bar(4),
            work_life_balance: bar(5),
        }
    }
}

impl Record for DiversityRecord {
    const FILE: OutputFile = OutputFile::Diversity;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_row<R: Record>(record: &R) -> Vec<String> {
        let mut writer = csv::Writer::from_writer(vec![]);
        writer.serialize(record).unwrap();
        let bytes = writer.into_inner().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        text.lines()
            .next()
            .unwrap()
            .split(',')
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_serialized_headers_match_output_files() {
        assert_eq!(header_row(&ReviewRecord::default()), OutputFile::Reviews.headers());
        assert_eq!(header_row(&SalaryRecord::default()), OutputFile::Salaries.headers());
        assert_eq!(header_row(&BenefitRecord::default()), OutputFile::Benefits.headers());
        assert_eq!(
            header_row(&OverallRatings::default()),
            OutputFile::OverallReviews.headers()
        );
        assert_eq!(
            header_row(&InterviewRecord {
                title: None,
                application: None,
                interview: None,
                question: NOT_PROVIDED.to_string(),
            }),
            OutputFile::Interviews.headers()
        );
    }

    #[test]
    fn test_diversity_from_modal() {
        let record = DiversityRecord::from_modal(
            Some("Women".to_string()),
            Some("4.1".to_string()),
            &["81".to_string(), "90".to_string()],
            &["3.9".to_string(), "4.0".to_string()],
        );
        assert_eq!(record.recommend_to_friend.as_deref(), Some("81%"));
        assert_eq!(record.approve_of_ceo.as_deref(), Some("90%"));
        assert_eq!(record.positive_business_outlook, None);
        assert_eq!(record.career_opportunities.as_deref(), Some("3.9"));
        assert_eq!(record.compensation_and_benefits.as_deref(), Some("4.0"));
        assert_eq!(record.work_life_balance, None);
    }
}
