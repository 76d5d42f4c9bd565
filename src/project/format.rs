//! Partial format settings from project files and the command line

use crate::annotate::{FormatScope, LabelPolicy, LineAfterJump, TimingDisplay};
use crate::maths::Base;
use clap::{App, Arg, ArgMatches, ArgSettings};
use serde::{Deserialize, Serialize};
use std::io;
use std::str::FromStr;

/// Format options to apply on top of the defaults before any directive.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct FormatOverride {
    address_base: Option<Base>,
    number_base: Option<Base>,
    opcode_bytes: Option<Base>,
    timing: Option<TimingDisplay>,
    line_after_jump: Option<LineAfterJump>,
    labels: Option<LabelPolicy>,
    label_period: Option<u8>,
    comments: Option<bool>,
    separator: Option<String>,
    flags: Option<bool>,
    mark_undocumented: Option<bool>,
    markup: Option<bool>,
    data_references: Option<bool>,
}

fn parse_value<T: FromStr>(args: &ArgMatches, name: &str) -> io::Result<Option<T>> {
    args.value_of(name)
        .map(|s| {
            T::from_str(s).map_err(|_| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("Invalid value {:?} for --{}", s, name),
                )
            })
        })
        .transpose()
}

fn flag(args: &ArgMatches, name: &str) -> Option<bool> {
    if args.is_present(name) {
        Some(true)
    } else {
        None
    }
}

impl FormatOverride {
    pub fn configure_app<'a, 'b>(app: App<'a, 'b>) -> App<'a, 'b> {
        app.arg(
            Arg::with_name("address-base")
                .long("address-base")
                .value_name("BASE")
                .help("Base of the address column (hex, dec, oct, bin).")
                .takes_value(true)
                .set(ArgSettings::Global),
        )
        .arg(
            Arg::with_name("number-base")
                .long("number-base")
                .value_name("BASE")
                .help("Base of operands and data.")
                .takes_value(true)
                .set(ArgSettings::Global),
        )
        .arg(
            Arg::with_name("opcode-bytes")
                .long("opcode-bytes")
                .value_name("BASE")
                .help("Show each instruction's bytes in this base.")
                .takes_value(true)
                .set(ArgSettings::Global),
        )
        .arg(
            Arg::with_name("timing")
                .long("timing")
                .value_name("MODE")
                .help("Timing column (off, total, states, both).")
                .takes_value(true)
                .set(ArgSettings::Global),
        )
        .arg(
            Arg::with_name("line-after-jump")
                .long("line-after-jump")
                .value_name("MODE")
                .help("Blank lines after jumps (never, absolute, all).")
                .takes_value(true)
                .set(ArgSettings::Global),
        )
        .arg(
            Arg::with_name("labels")
                .long("labels")
                .value_name("POLICY")
                .help("Which addresses to print (all, none, referenced).")
                .takes_value(true)
                .set(ArgSettings::Global),
        )
        .arg(
            Arg::with_name("label-period")
                .long("label-period")
                .value_name("N")
                .help("Print an address at least every N lines.")
                .takes_value(true)
                .set(ArgSettings::Global),
        )
        .arg(
            Arg::with_name("flags")
                .long("flags")
                .help("Show the flags column.")
                .set(ArgSettings::Global),
        )
        .arg(
            Arg::with_name("mark-undocumented")
                .long("mark-undocumented")
                .help("Mark undocumented instructions with '*'.")
                .set(ArgSettings::Global),
        )
        .arg(
            Arg::with_name("markup")
                .long("markup")
                .help("Write the listing as XML.")
                .set(ArgSettings::Global),
        )
    }

    pub fn from_arg_matches(args: &ArgMatches) -> io::Result<Self> {
        Ok(FormatOverride {
            address_base: parse_value(args, "address-base")?,
            number_base: parse_value(args, "number-base")?,
            opcode_bytes: parse_value(args, "opcode-bytes")?,
            timing: parse_value(args, "timing")?,
            line_after_jump: parse_value(args, "line-after-jump")?,
            labels: parse_value(args, "labels")?,
            label_period: parse_value(args, "label-period")?,
            comments: None,
            separator: None,
            flags: flag(args, "flags"),
            mark_undocumented: flag(args, "mark-undocumented"),
            markup: flag(args, "markup"),
            data_references: None,
        })
    }

    /// Write every option that is set into `scope`.
    pub fn apply(&self, scope: &mut FormatScope) {
        if let Some(base) = self.address_base {
            scope.address_base = base;
        }
        if let Some(base) = self.number_base {
            scope.number_base = base;
        }
        if let Some(base) = self.opcode_bytes {
            scope.opcode_bytes = Some(base);
        }
        if let Some(timing) = self.timing {
            scope.timing = timing;
        }
        if let Some(policy) = self.line_after_jump {
            scope.line_after_jump = policy;
        }
        if let Some(policy) = self.labels {
            scope.labels = policy;
        }
        if let Some(period) = self.label_period {
            scope.label_period = period;
        }
        if let Some(comments) = self.comments {
            scope.comments = comments;
        }
        if let Some(separator) = &self.separator {
            scope.separator = separator.clone();
        }
        if let Some(flags) = self.flags {
            scope.flags = flags;
        }
        if let Some(mark) = self.mark_undocumented {
            scope.mark_undocumented = mark;
        }
        if let Some(markup) = self.markup {
            scope.markup = markup;
        }
        if let Some(references) = self.data_references {
            scope.data_references = references;
        }
    }

    /// The default scope with these options applied.
    pub fn scope(&self) -> FormatScope {
        let mut scope = FormatScope::default();
        self.apply(&mut scope);
        scope
    }

    /// Options set in `other` win over ours.
    pub fn apply_override(&self, other: &FormatOverride) -> FormatOverride {
        FormatOverride {
            address_base: other.address_base.or(self.address_base),
            number_base: other.number_base.or(self.number_base),
            opcode_bytes: other.opcode_bytes.or(self.opcode_bytes),
            timing: other.timing.or(self.timing),
            line_after_jump: other.line_after_jump.or(self.line_after_jump),
            labels: other.labels.or(self.labels),
            label_period: other.label_period.or(self.label_period),
            comments: other.comments.or(self.comments),
            separator: other.separator.clone().or_else(|| self.separator.clone()),
            flags: other.flags.or(self.flags),
            mark_undocumented: other.mark_undocumented.or(self.mark_undocumented),
            markup: other.markup.or(self.markup),
            data_references: other.data_references.or(self.data_references),
        }
    }
}
