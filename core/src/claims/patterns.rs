use crate::error::{CoreError, CoreResult};
use crate::model::ElementType;
use regex::Regex;

// Clause boundaries inside a claim body: semicolons, colons, "wherein",
// "further comprising", enumerations like "(a)" and list conjunctions.
const CLAUSE_BOUNDARY: &str = r"(?x)
    ; | : | \n | \.\s+
    | \bwherein\b | \bwhereby\b
    | \bfurther\s+comprising\b | \bfurther\s+including\b
    | \bcharacteri[sz]ed\s+(?:by|in\s+that)\b
    | ,\s*and\b | ,\s*or\b
    | \band\s+(?:a|an)\b
    | \(\s*[a-z0-9]{1,3}\s*\)
";

// Bare conjunction between items of an enumeration: "a coil and a shield"
// is already split above, "coil and shield" only inside a list.
const LIST_CONJUNCTION: &str = r"\s+(?:and|or)\s+";

// Transitional phrase separating the preamble from the body.
const TRANSITION: &str =
    r"\b(?:comprising|comprises|consisting\s+essentially\s+of|consisting\s+of|including|having)\b";

// "The system of claim 1," / "A method according to claims 2 or 3,"
const DEPENDENCY_PREAMBLE: &str = r"(?x)
    ^\s*(?:the|a|an)\s+[a-z0-9\s-]*?
    \b(?:of|according\s+to|as\s+claimed\s+in|as\s+recited\s+in|as\s+defined\s+in|in)\s+
    claims?\s+(\d+)(?:\s*(?:or|and|-|to)\s*\d+)*\s*,?
";

const CLAIM_NUMBER: &str = r"^\s*(\d+)\s*[.)]\s*";

const METHOD_PREAMBLE: &str = r"\b(?:method|process|procedure)\b";

const STEP_VERBS: &str = "receiving|transmitting|sending|determining|measuring|detecting|\
    generating|providing|controlling|calculating|computing|comparing|storing|adjusting|applying|\
    converting|monitoring|identifying|selecting|establishing|initiating|terminating|charging|\
    discharging|supplying|regulating|sensing|estimating|aligning|positioning|coupling|\
    disconnecting|connecting|switching|operating|obtaining|transferring|communicating|\
    authenticating|verifying|activating|deactivating|limiting|balancing|heating|cooling";

// Checked in order; the first table with a matching pattern decides the tag.
// Anything unmatched falls back to the claim category.
const PARAMETER_PATTERNS: &[&str] = &[
    r"\b\d+(?:\.\d+)?\s*(?:%|percent|v|volts?|kv|kw|kwh|w|watts?|hz|khz|mhz|ghz|a|amps?|mah|mm|cm|m|ms|s|seconds?|minutes?|degrees?|deg|c)\b",
    r"\b(?:less|greater|more|fewer|lower|higher)\s+than\b",
    r"\b(?:between|ranging\s+from|within\s+a\s+range|at\s+least|at\s+most|no\s+more\s+than|not\s+exceeding)\b",
    r"\b(?:threshold|frequency|voltage|current|temperature|ratio|duty\s+cycle)\s+(?:of|is|being|that)\b",
];

const METHOD_PATTERNS: &[&str] = &[r"^\s*(?:a\s+|an\s+|the\s+)?(?:method|process|procedure)\b"];

pub struct PatternTable {
    pub clause_boundary: Regex,
    pub list_conjunction: Regex,
    pub transition: Regex,
    pub dependency_preamble: Regex,
    pub claim_number: Regex,
    pub method_preamble: Regex,
    element_types: Vec<(ElementType, Regex)>,
}

impl PatternTable {
    pub fn compile() -> CoreResult<Self> {
        let step_pattern = format!(
            r"^\s*(?:and\s+|or\s+)?(?:{})\s+(?:a|an|the|said|one|each|at|whether|that|to|from|in|on|with|by)\b",
            STEP_VERBS
        );

        let mut element_types = Vec::new();
        for p in PARAMETER_PATTERNS {
            element_types.push((ElementType::Parameter, compile(p)?));
        }
        for p in METHOD_PATTERNS {
            element_types.push((ElementType::Method, compile(p)?));
        }
        element_types.push((ElementType::Step, compile(&step_pattern)?));

        Ok(Self {
            clause_boundary: compile(CLAUSE_BOUNDARY)?,
            list_conjunction: compile(LIST_CONJUNCTION)?,
            transition: compile(TRANSITION)?,
            dependency_preamble: compile(DEPENDENCY_PREAMBLE)?,
            claim_number: compile(CLAIM_NUMBER)?,
            method_preamble: compile(METHOD_PREAMBLE)?,
            element_types,
        })
    }

    /// Tag a folded segment. Method claims default to steps, everything else
    /// to apparatus.
    pub fn classify(&self, segment: &str, claim_category: ElementType) -> ElementType {
        for (element_type, re) in &self.element_types {
            if re.is_match(segment) {
                return *element_type;
            }
        }
        match claim_category {
            ElementType::Method | ElementType::Step => ElementType::Step,
            _ => ElementType::Apparatus,
        }
    }
}

fn compile(pattern: &str) -> CoreResult<Regex> {
    Regex::new(pattern)
        .map_err(|e| CoreError::Configuration(format!("claim pattern failed to compile: {}", e)))
}
