//! Query rewrites used by the count estimator and offset batching

use super::parser::{ClauseKind, SoqlQuery};

impl SoqlQuery {
    /// Count-only variant: `select count() <from ...>`, cut at the first
    /// clause a count query may not carry.
    ///
    /// Text between the cut and the preceding clause is kept verbatim, so
    /// `select id from Account order by name` becomes
    /// `select count() from Account ` (trailing space included).
    pub fn count_query(&self) -> String {
        let text = self.as_str();
        let end = self
            .clauses()
            .iter()
            .find(|c| c.kind.is_disallowed_in_count())
            .map_or(text.len(), |c| c.start);
        format!("select count() {}", &text[self.from_start()..end])
    }

    /// Variant bounded to one batch: `LIMIT <limit> OFFSET <offset>`.
    ///
    /// Existing top-level `LIMIT`/`OFFSET` clauses are replaced. With an
    /// `ORDER BY` the new clause goes immediately before it, so
    /// `select id from Account order by name` becomes
    /// `select id from Account  LIMIT 2000 OFFSET 0 order by name`.
    /// Otherwise it is appended, ahead of any trailing `FOR VIEW`/`FOR UPDATE`.
    pub fn with_limit_offset(&self, limit: u64, offset: u64) -> String {
        let text = self.as_str();
        let bounds = format!("LIMIT {limit} OFFSET {offset}");
        let for_clause = self.clause(ClauseKind::For).map(|c| &text[c.start..]);
        let body_end = self
            .clauses()
            .iter()
            .find(|c| matches!(c.kind, ClauseKind::Limit | ClauseKind::Offset | ClauseKind::For))
            .map(|c| c.start);

        let bounded = match (self.clause(ClauseKind::OrderBy), body_end) {
            (Some(order), end) => {
                let end = end.filter(|&e| e > order.start).unwrap_or(text.len());
                let ordering = &text[order.start..end];
                format!("{} {bounds} {}", &text[..order.start], ordering.trim_end())
            }
            (None, Some(end)) => format!("{} {bounds}", text[..end].trim_end()),
            (None, None) => format!("{text} {bounds}"),
        };

        match for_clause {
            Some(tail) => format!("{bounded} {tail}"),
            None => bounded,
        }
    }
}
