//! Canned-answer fallback table.
//!
//! When the remote path fails, the query is matched against a fixed,
//! ordered list of keywords; the first keyword found as a substring of the
//! lowercased query wins. Immutable, process-wide.

/// Ordered keyword → canned-answer table plus the generic default tip.
#[derive(Debug, Clone)]
pub struct FallbackTable {
    entries: Vec<(String, String)>,
    default_tip: String,
}

impl Default for FallbackTable {
    fn default() -> Self {
        Self {
            entries: vec![
                (
                    "security".into(),
                    "⌛ Allow 30-45 mins for security. Pack liquids in clear bags (100ml max), \
                     remove laptops, wear easy-off shoes."
                        .into(),
                ),
                (
                    "lounge".into(),
                    "💺 Most lounges require business class tickets or priority pass. \
                     Day passes often available (~$50). Locations near gates: "
                        .into(),
                ),
                (
                    "connection".into(),
                    "🔄 Minimum connection times: Domestic 45mins, International 90mins. \
                     Use airport maps or ask staff for fastest routes."
                        .into(),
                ),
                (
                    "baggage".into(),
                    "🛄 Checked bags usually due 60mins pre-flight. Carry-on max typically \
                     7kg (varies by airline)."
                        .into(),
                ),
            ],
            default_tip: "✈️ General tip: Arrive 2hrs early for domestic, 3hrs for \
                          international flights. Check airport maps for gate locations."
                .into(),
        }
    }
}

impl FallbackTable {
    /// Return the first canned answer whose keyword appears in the query.
    ///
    /// Matching is case-insensitive and substring-based; table order
    /// decides precedence when several keywords match.
    pub fn resolve(&self, query: &str) -> Option<&str> {
        let lowered = query.to_lowercase();
        self.entries
            .iter()
            .find(|(keyword, _)| lowered.contains(keyword.as_str()))
            .map(|(_, answer)| answer.as_str())
    }

    /// The generic tip returned when no keyword matches.
    pub fn default_tip(&self) -> &str {
        &self.default_tip
    }
}
