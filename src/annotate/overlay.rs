//! Pending directives and live comment matchers

use crate::annotate::{CommentPosition, Directive, DirectiveKind};
use crate::arch::z80::Operand;
use std::collections::BTreeMap;

/// Directives not yet consumed by the walk, plus the reference and
/// displacement comments currently in range.
#[derive(Clone, Debug, Default)]
pub struct Overlay {
    /// Keyed by range, then arrival order.
    pending: BTreeMap<(u16, u16, u64), Directive>,
    arrivals: u64,

    /// Sorted by end address.
    live: Vec<Directive>,
}

impl Overlay {
    pub fn new<I>(directives: I) -> Self
    where
        I: IntoIterator<Item = Directive>,
    {
        let mut overlay = Overlay::default();
        for directive in directives {
            overlay.insert(directive);
        }

        overlay
    }

    pub fn insert(&mut self, directive: Directive) {
        let key = (directive.start, directive.end, self.arrivals);
        self.arrivals += 1;
        self.pending.insert(key, directive);
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn live_len(&self) -> usize {
        self.live.len()
    }

    /// Remove and return the first pending directive that has started by
    /// `cursor`. Plain comments are left for `take_comments`.
    pub fn take_active(&mut self, cursor: u32) -> Option<Directive> {
        let key = *self
            .pending
            .iter()
            .take_while(|((start, _, _), _)| *start as u32 <= cursor)
            .find(|(_, d)| !d.is_plain_comment())?
            .0;

        self.pending.remove(&key)
    }

    /// Remove every plain comment starting at or before `last`. Comments
    /// whose whole range lies before `first` are dropped; the rest are
    /// returned in order.
    pub fn take_comments(&mut self, first: u32, last: u32) -> Vec<(CommentPosition, String)> {
        let keys: Vec<_> = self
            .pending
            .iter()
            .take_while(|((start, _, _), _)| *start as u32 <= last)
            .filter(|(_, d)| d.is_plain_comment())
            .map(|(k, _)| *k)
            .collect();

        let mut taken = Vec::new();
        for key in keys {
            if let Some(Directive {
                end,
                kind: DirectiveKind::Comment { position, text },
                ..
            }) = self.pending.remove(&key)
            {
                if end as u32 >= first {
                    taken.push((position, text));
                }
            }
        }

        taken
    }

    /// Start matching a reference or displacement comment.
    pub fn activate(&mut self, directive: Directive) {
        let at = self
            .live
            .iter()
            .position(|d| d.end > directive.end)
            .unwrap_or_else(|| self.live.len());

        self.live.insert(at, directive);
    }

    /// Drop live comments that end before `cursor`.
    pub fn expire(&mut self, cursor: u32) {
        let expired = self
            .live
            .iter()
            .take_while(|d| (d.end as u32) < cursor)
            .count();

        self.live.drain(..expired);
    }

    /// Comments triggered by one operand of the instruction at `address`.
    pub fn match_operand(&self, address: u32, operand: &Operand) -> Vec<(CommentPosition, String)> {
        self.live
            .iter()
            .filter(|d| d.contains(address))
            .filter_map(|d| match &d.kind {
                DirectiveKind::CommentReference {
                    position,
                    matching,
                    value,
                    text,
                } if matching.matches(operand) == Some(*value) => Some((*position, text.clone())),
                DirectiveKind::CommentDisplacement {
                    position,
                    matching,
                    displacement,
                    text,
                } if matching.matches(operand) == Some(*displacement) => {
                    Some((*position, text.clone()))
                }
                _ => None,
            })
            .collect()
    }
}
