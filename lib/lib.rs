#![allow(clippy::needless_return)]

//! Formats numeric analysis results (plain numbers, uncertain pairs, dates,
//! percentages) as significant-figure-rounded strings and keeps them
//! synchronized as named `\newcommand` definitions in a shared LaTeX file,
//! so a document always displays the values a pipeline last computed.
//!
//! ```no_run
//! use texval::{ output::ValueFile, value::Measured };
//!
//! let defs = ValueFile::new("values.tex").with_prefix("run");
//! defs.set("SampleCount", 12345)?;
//! defs.set("Efficiency", Measured::new(0.873, 0.004))?;
//! # Ok::<(), texval::output::OutputError>(())
//! ```

pub mod value;
pub mod round;
pub mod display;
pub mod output;
