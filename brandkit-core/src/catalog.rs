//! Discovery questions and static fallback name tables.

use crate::session::{Attribute, Stage};

/// One multiple-choice discovery question.
#[derive(Debug, Clone)]
pub struct Question {
    pub stage: Stage,
    pub attribute: Attribute,
    pub text: &'static str,
    pub options: &'static [&'static str],
}

impl Question {
    /// Resolve a 1-based selector into an option.
    pub fn select(&self, reply: &str) -> Option<&'static str> {
        let n: usize = reply.trim().parse().ok()?;
        n.checked_sub(1).and_then(|i| self.options.get(i)).copied()
    }
}

/// Ordered list of discovery questions.
#[derive(Debug, Clone)]
pub struct Catalog {
    questions: Vec<Question>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            questions: vec![
                Question {
                    stage: Stage::Industry,
                    attribute: Attribute::Industry,
                    text: "What industry is your brand in?",
                    options: &[
                        "Technology",
                        "Healthcare",
                        "Fashion",
                        "Food & Beverage",
                        "Education",
                        "Finance",
                        "Entertainment",
                    ],
                },
                Question {
                    stage: Stage::Theme,
                    attribute: Attribute::Theme,
                    text: "Choose your logo style:",
                    options: &["Minimalist", "Professional", "Playful"],
                },
                Question {
                    stage: Stage::ColorScheme,
                    attribute: Attribute::ColorScheme,
                    text: "Choose a color scheme:",
                    options: &["Blue", "Black", "Green"],
                },
            ],
        }
    }
}

impl Catalog {
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Index of the question asked at `stage`, if it is a discovery stage.
    pub fn position(&self, stage: Stage) -> Option<usize> {
        self.questions.iter().position(|q| q.stage == stage)
    }
}

/// Returned when the text generator cannot produce names.
pub const GENERIC_SUGGESTIONS: [&str; 3] = ["1. ProBrand", "2. CoreHub", "3. BizPro"];

/// Alternate names for industries without their own table.
pub const DEFAULT_ALTERNATES: [&str; 5] = [
    "1. ProBrand",
    "2. CoreHub",
    "3. BizPro",
    "4. SmartPro",
    "5. ElitePro",
];

/// Alternate names shown when the user asks for more suggestions.
///
/// Matching is case-insensitive on the industry label.
pub fn alternates_for(industry: &str) -> &'static [&'static str] {
    match industry.to_lowercase().as_str() {
        "technology" => &["1. TechPro", "2. DigiCore", "3. ByteWise", "4. InnoTech", "5. SmartCore"],
        "healthcare" => &["1. HealthHub", "2. CarePlus", "3. MediCare", "4. VitalPro", "5. WellCore"],
        "fashion" => &["1. StyleHub", "2. TrendSet", "3. ModePro", "4. FashionCore", "5. ChicPro"],
        "food & beverage" => &["1. FreshBite", "2. TastePro", "3. FlavorHub", "4. FoodCore", "5. YumPro"],
        "education" => &["1. LearnPro", "2. EduCore", "3. SkillHub", "4. BrainPro", "5. TeachSmart"],
        "finance" => &["1. FinCore", "2. WealthPro", "3. MoneyHub", "4. CapitalPro", "5. InvestSmart"],
        "entertainment" => &["1. FunHub", "2. PlayCore", "3. JoyPro", "4. EntertainPro", "5. FunZone"],
        _ => &DEFAULT_ALTERNATES,
    }
}
