/// A vocabulary word together with the definition and example sentence
/// produced for it by the generation service.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnrichedWord {
    pub word: String,
    pub definition: String,
    pub example: String,
}

impl EnrichedWord {
    /// Whether all three fields carry some non-whitespace text.
    pub fn is_complete(&self) -> bool {
        [&self.word, &self.definition, &self.example]
            .iter()
            .all(|field| !field.trim().is_empty())
    }
}
