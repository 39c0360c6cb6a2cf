//! Pattern library for medical entity matching.
//!
//! Categories are declared as data (category -> list of pattern strings) and
//! compiled once at startup. Matching is word-boundary-aware against
//! lower-cased input, so all pattern literals are lower-case. Adding terms or
//! categories means registering a new group; the extractor's control flow
//! never changes.

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Pattern library errors.
#[derive(Error, Debug)]
pub enum PatternError {
    #[error("invalid pattern for {category:?}: {pattern}: {source}")]
    InvalidPattern {
        category: EntityCategory,
        pattern: String,
        source: regex::Error,
    },
}

pub type PatternResult<T> = Result<T, PatternError>;

/// Entity categories, in evaluation order.
///
/// SEVERITY and DURATION are symptom attributes: the extractor only
/// evaluates them once a SYMPTOM pattern has matched.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityCategory {
    Medication,
    Symptom,
    Severity,
    Duration,
    Condition,
    Vitals,
}

impl EntityCategory {
    /// All categories in evaluation order.
    pub const ALL: [EntityCategory; 6] = [
        EntityCategory::Medication,
        EntityCategory::Symptom,
        EntityCategory::Severity,
        EntityCategory::Duration,
        EntityCategory::Condition,
        EntityCategory::Vitals,
    ];

    /// Result-map key for this category.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityCategory::Medication => "MEDICATION",
            EntityCategory::Symptom => "SYMPTOM",
            EntityCategory::Severity => "SEVERITY",
            EntityCategory::Duration => "DURATION",
            EntityCategory::Condition => "CONDITION",
            EntityCategory::Vitals => "VITALS",
        }
    }

    /// Whether this category refines symptoms rather than standing alone.
    pub fn is_symptom_attribute(&self) -> bool {
        matches!(self, EntityCategory::Severity | EntityCategory::Duration)
    }
}

/// A compiled group of alternation patterns for one category.
#[derive(Debug)]
pub struct PatternGroup {
    pub category: EntityCategory,
    pub patterns: Vec<Regex>,
}

/// The full pattern library: one group per category, in evaluation order.
#[derive(Debug)]
pub struct PatternLibrary {
    groups: Vec<PatternGroup>,
}

impl PatternLibrary {
    /// Compile the built-in medical pattern groups.
    pub fn standard() -> PatternResult<Self> {
        let mut library = Self { groups: Vec::new() };
        library.register(EntityCategory::Medication, MEDICATION_PATTERNS)?;
        library.register(EntityCategory::Symptom, SYMPTOM_PATTERNS)?;
        library.register(EntityCategory::Severity, SEVERITY_PATTERNS)?;
        library.register(EntityCategory::Duration, DURATION_PATTERNS)?;
        library.register(EntityCategory::Condition, CONDITION_PATTERNS)?;
        library.register(EntityCategory::Vitals, VITAL_PATTERNS)?;
        Ok(library)
    }

    /// Build a library from custom (category, patterns) groups.
    pub fn from_groups<'a, I>(groups: I) -> PatternResult<Self>
    where
        I: IntoIterator<Item = (EntityCategory, &'a [&'a str])>,
    {
        let mut library = Self { groups: Vec::new() };
        for (category, patterns) in groups {
            library.register(category, patterns)?;
        }
        Ok(library)
    }

    /// Register additional patterns for a category.
    ///
    /// Appends to the category's existing group if present, otherwise adds a
    /// new group at the end of the evaluation order.
    pub fn register(
        &mut self,
        category: EntityCategory,
        patterns: &[&str],
    ) -> PatternResult<()> {
        let compiled = patterns
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|source| PatternError::InvalidPattern {
                    category,
                    pattern: (*p).to_string(),
                    source,
                })
            })
            .collect::<PatternResult<Vec<_>>>()?;

        if let Some(group) = self.groups.iter_mut().find(|g| g.category == category) {
            group.patterns.extend(compiled);
        } else {
            self.groups.push(PatternGroup {
                category,
                patterns: compiled,
            });
        }
        Ok(())
    }

    /// Groups in evaluation order.
    pub fn groups(&self) -> &[PatternGroup] {
        &self.groups
    }
}

/// Medication names, dosage and frequency patterns.
const MEDICATION_PATTERNS: &[&str] = &[
    // Common over-the-counter medications
    r"\b(advil|tylenol|aspirin|ibuprofen|acetaminophen|paracetamol|naproxen|aleve)\b",
    // Common prescription medications
    r"\b(lisinopril|atorvastatin|metformin|levothyroxine|amlodipine|metoprolol|omeprazole)\b",
    r"\b(simvastatin|losartan|gabapentin|hydrochlorothiazide|sertraline|montelukast)\b",
    r"\b(pantoprazole|furosemide|fluticasone|escitalopram|amoxicillin|azithromycin)\b",
    r"\b(prednisone|fluoxetine|albuterol|citalopram|tamsulosin|rosuvastatin)\b",
    r"\b(warfarin|tramadol|bupropion|clopidogrel|carvedilol|hydrocodone)\b",
    // Medication classes and forms
    r"\b(insulin|ventolin|albuterol|inhaler|epipen|antibiotic|antihistamine)\b",
    r"\b(steroid|statin|beta.?blocker|calcium.?channel.?blocker|ace.?inhibitor|arb)\b",
    r"\b(ssri|snri|antidepressant|antipsychotic|antianxiety|sleeping.?pill)\b",
    r"\b(blood.?thinner|anticoagulant|pain.?killer|nsaid|opioid|narcotic)\b",
    // Dosage patterns
    r"\b\d+\s*mg\b",
    r"\b\d+\s*mcg\b",
    r"\b\d+\s*ml\b",
    r"\b\d+\s*tablets?\b",
    r"\b\d+\s*doses?\b",
    r"\b\d+\s*pills?\b",
    // Frequency patterns
    r"\b(once|twice|three times) (daily|a day)\b",
    r"\bq\d+h\b",
    r"\b(every|each) \d+ (hours?|days?|weeks?)\b",
    r"\b(in the|at) (morning|night|evening|afternoon)\b",
];

/// Symptom keyword groups.
const SYMPTOM_PATTERNS: &[&str] = &[
    // General symptoms
    r"\b(headache|migraine|pain|ache|fever|cough|nausea|vomiting|dizziness|fatigue|tired)\b",
    // Specific pains
    r"\b(chest pain|back pain|throat pain|stomach pain|abdominal pain|joint pain)\b",
    // Respiratory
    r"\b(shortness of breath|difficulty breathing|wheezing|phlegm|congestion)\b",
    r"\b(runny nose|stuffy nose|sore throat|hoarse voice|dry cough|wet cough)\b",
    // Digestive
    r"\b(diarrhea|constipation|indigestion|heartburn|bloating|gas)\b",
    r"\b(stomach ache|abdominal cramping|bloody stool|black stool|nausea|vomiting)\b",
    // Neurological
    r"\b(numbness|tingling|weakness|confusion|memory loss|seizure)\b",
    r"\b(dizziness|fainting|lightheaded|vertigo|headache|migraine|concussion)\b",
    // Cardiovascular
    r"\b(palpitations|irregular heartbeat|fast heart rate|slow heart rate)\b",
    r"\b(chest tightness|shortness of breath|cyanosis|edema|swelling)\b",
    // Skin
    r"\b(rash|swelling|bleeding|bruising|itching|lump|bump)\b",
    r"\b(hives|welts|blisters|redness|scaling|peeling)\b",
    // Sensory
    r"\b(blurry vision|double vision|hearing loss|ringing in ears)\b",
    r"\b(eye pain|ear pain|loss of taste|loss of smell)\b",
    // Sleep
    r"\b(insomnia|trouble sleeping|sleep apnea|snoring)\b",
    r"\b(nightmares|night sweats|restless leg|teeth grinding)\b",
    // Mental health
    r"\b(anxiety|depression|panic attack|stress|mood swings)\b",
    r"\b(irritability|difficulty concentrating|racing thoughts)\b",
    // Qualified symptoms
    r"\b(mild|moderate|severe|extreme|excruciating) (pain|discomfort|fever|headache|cough)\b",
    r"\b(slight|significant|unbearable|manageable) (pain|discomfort|symptom)\b",
    // Time-qualified symptoms
    r"\b(for|since|over the last|past) \d+ (hours?|days?|weeks?|months?|years?)\b",
    r"\b(chronic|acute|persistent|intermittent|constant|occasional)\b",
    r"\bstarted \d+ (hours?|days?|weeks?|months?) ago\b",
];

/// Severity qualifiers (evaluated only when a symptom matched).
const SEVERITY_PATTERNS: &[&str] = &[
    // Severity with symptoms
    r"\b(mild|moderate|severe|extreme|excruciating) (pain|discomfort|fever|headache|cough|symptoms?)\b",
    r"\b(slight|significant|unbearable|manageable) (pain|discomfort|symptom)\b",
    // Pain scales
    r"\bpain (?:level|scale|score)? (?:of )?(\d+)(?: ?\/? ?\d+)?\b",
    r"\b(\d+)(?: ?\/? ?\d+)? (?:on|out of) (?:a |the )?pain (?:scale|level)\b",
    // General severity words
    r"\b(worsen(?:ing|ed)?|improv(?:ing|ed)?|better|worse|unchanged|intolerable)\b",
];

/// Duration phrases (evaluated only when a symptom matched).
const DURATION_PATTERNS: &[&str] = &[
    // Time periods
    r"\b(for|since|over the last|past) \d+ (hours?|days?|weeks?|months?|years?)\b",
    r"\bstarted \d+ (hours?|days?|weeks?|months?|years?) ago\b",
    r"\b\d+ (hours?|days?|weeks?|months?|years?) (ago|duration|episode|history)\b",
    // Qualitative duration
    r"\b(chronic|acute|persistent|intermittent|constant|occasional|recurring|episodic)\b",
    // Since specific time
    r"\bsince (yesterday|this morning|last night|last week|last month)\b",
    // Other time patterns
    r"\b(comes and goes|on and off|all the time|constantly)\b",
];

/// Medical condition keyword groups.
const CONDITION_PATTERNS: &[&str] = &[
    // Common chronic conditions
    r"\b(diabetes|hypertension|high blood pressure|asthma|copd|cancer)\b",
    r"\b(arthritis|depression|anxiety|insomnia|allergies|migraine)\b",
    r"\b(heart disease|heart attack|stroke|seizure|epilepsy)\b",
    // Chronic conditions
    r"\b(chronic pain|chronic fatigue|fibromyalgia|lupus|ms|multiple sclerosis)\b",
    r"\b(osteoporosis|parkinson|alzheimer|dementia|hypothyroidism|hyperthyroidism)\b",
    // Infections
    r"\b(infection|pneumonia|bronchitis|sinusitis|flu|influenza|cold)\b",
    r"\b(uti|urinary tract infection|strep throat|viral infection|bacterial infection)\b",
    r"\b(covid|coronavirus|covid-19|mono|mononucleosis|lyme disease)\b",
    // Digestive conditions
    r"\b(gerd|acid reflux|ibs|irritable bowel|crohn|ulcerative colitis|celiac)\b",
    r"\b(gallstones|diverticulitis|pancreatitis|hepatitis|cirrhosis|gastritis)\b",
    // Skin conditions
    r"\b(eczema|psoriasis|rosacea|acne|dermatitis|shingles|hives)\b",
    // Respiratory conditions
    r"\b(asthma|copd|emphysema|bronchitis|sleep apnea|pulmonary fibrosis)\b",
    // Cardiovascular conditions
    r"\b(hypertension|high blood pressure|afib|atrial fibrillation|coronary artery disease|arrhythmia)\b",
    r"\b(tachycardia|bradycardia|heart failure|congestive heart failure|aneurysm)\b",
    // Endocrine
    r"\b(thyroid|hypothyroidism|hyperthyroidism|diabetes|type 1|type 2|cushings|addisons)\b",
    // Mental health
    r"\b(depression|anxiety|bipolar|schizophrenia|ocd|ptsd|adhd|add)\b",
    // Other
    r"\b(anemia|kidney disease|liver disease|osteoporosis)\b",
    r"\b(glaucoma|cataracts|macular degeneration|retinopathy)\b",
];

/// Vital-sign patterns.
const VITAL_PATTERNS: &[&str] = &[
    // Blood pressure
    r"\bbp\s*(?:of|is|was)?\s*(\d{2,3}\/\d{2,3})\b",
    r"\bblood pressure\s*(?:of|is|was)?\s*(\d{2,3}\/\d{2,3})\b",
    r"\bsystolic\s*(?:of|is|was)?\s*(\d{2,3})\b",
    r"\bdiastolic\s*(?:of|is|was)?\s*(\d{2,3})\b",
    // Heart rate
    r"\bhr\s*(?:of|is|was)?\s*(\d{2,3})\b",
    r"\bheart rate\s*(?:of|is|was)?\s*(\d{2,3})\b",
    r"\bpulse\s*(?:of|is|was)?\s*(\d{2,3})\b",
    // Temperature
    r"\btemp\s*(?:of|is|was)?\s*(\d{2,3}(?:\.\d)?)\s*[fc]?\b",
    r"\btemperature\s*(?:of|is|was)?\s*(\d{2,3}(?:\.\d)?)\s*[fc]?\b",
    r"\bfever\s*(?:of|is|was)?\s*(\d{2,3}(?:\.\d)?)\s*[fc]?\b",
    // Respiratory rate
    r"\brr\s*(?:of|is|was)?\s*(\d{1,2})\b",
    r"\brespiratory rate\s*(?:of|is|was)?\s*(\d{1,2})\b",
    // Oxygen saturation
    r"\bo2 sat\s*(?:of|is|was)?\s*(\d{1,3})%?\b",
    r"\boxygen saturation\s*(?:of|is|was)?\s*(\d{1,3})%?\b",
    r"\bspo2\s*(?:of|is|was)?\s*(\d{1,3})%?\b",
    // Blood glucose
    r"\bglucose\s*(?:of|is|was)?\s*(\d{2,4})\b",
    r"\bblood sugar\s*(?:of|is|was)?\s*(\d{2,4})\b",
    // Weight
    r"\bweight\s*(?:of|is|was)?\s*(\d{2,3}(?:\.\d)?)\s*(?:kg|lbs?)?\b",
    // Height
    r"\bheight\s*(?:of|is|was)?\s*(\d{1,3}(?:\.\d)?)\s*(?:cm|m|ft|inches)?\b",
    r#"\b(\d{1}[\'\"]?\d{1,2}[\"\']?)\s*(?:cm|m|ft|inches|tall|height)\b"#,
];
