//! Renders rounded values in their final textual form: thousands grouping,
//! decimal-place capping, uncertainty pairs, percentages, large-number
//! words, and the auxiliary-entry fan-out for styled values.

use thiserror::Error;
use crate::{
    round::{
        self,
        find_sig_figs_significance,
        round_value,
        Rounded,
        RoundError,
    },
    value::{ Measured, Value },
};

/// Significant figures used when the caller doesn't ask for a count.
pub const DEFAULT_SIG_FIGS: usize = 3;

/// Thousands separator spliced between integer digit groups.
const SEPARATOR: &str = r"\,";

#[derive(Debug, Error)]
pub enum DisplayError {
    /// Percentage formatting accepts numeric values only.
    #[error("display: cannot render '{0}' as a percentage")]
    NotAPercentage(&'static str),

    #[error(transparent)]
    Round(#[from] RoundError),
}
pub type DisplayResult<T> = Result<T, DisplayError>;

/// How a value is rendered and which auxiliary entries it fans out to.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Style {
    /// Significant-figure rounding with grouping; dates and uncertain pairs
    /// fan out auxiliary entries.
    #[default]
    Default,
    /// Verbatim rendering: no rounding, no separators, no auxiliaries.
    Plain,
    /// Multiply by 100 and mark with a percent sign.
    Percent,
    /// Multiply by 100 with no percent sign.
    BarePercent,
    /// Scientific `\num{...}` form for small magnitudes.
    Small,
    /// A day count, persisted alongside a derived year count.
    Days,
}

/// Round `value` to `sig_figs` significant figures and render it for
/// inclusion in a document.
///
/// Integer digits are grouped with thin spaces. `max_dp` truncates decimal
/// digits beyond the cap (never rounding a second time) and replaces a
/// value whose magnitude falls below the cap's resolution with a `<`
/// marker, sign preserved. An uncertain value renders as a math-mode
/// `\pm` pair.
///
/// ```
/// # use texval::{ display::display_num, value::Value };
/// assert_eq!(display_num(&Value::Int(1234), 3, None).unwrap(), r"1\,230");
/// assert_eq!(display_num(&Value::Float(-12.3), 3, None).unwrap(), "-12.3");
/// assert_eq!(display_num(&Value::from((10.0, 0.1)), 3, None).unwrap(), r"$10.0 \pm 0.1$");
/// ```
pub fn display_num(value: &Value, sig_figs: usize, max_dp: Option<usize>)
    -> DisplayResult<String>
{
    return match value {
        Value::Measured(m) => Ok(display_measured(m, sig_figs, max_dp)),
        _ => {
            let rounded: Rounded = round_value(value, sig_figs)?;
            let grouped: String = group_thousands(&rounded.to_string());
            Ok(cap_decimals(grouped, rounded.as_f64(), max_dp))
        },
    };
}

/// Render a nominal-plus-spread pair as a math-mode `\pm` expression.
///
/// A spread strictly smaller in magnitude than one unit in the nominal's
/// last significant place would round to pure noise, so it is reported as
/// exactly zero. The spread never shows more decimal places than the
/// nominal; `max_dp` applies to the nominal only.
pub fn display_measured(m: &Measured, sig_figs: usize, max_dp: Option<usize>)
    -> String
{
    let (nominal, spread): (String, String) =
        measured_parts(m, sig_figs, max_dp);
    return format!(r"${} \pm {}$", nominal, spread);
}

fn measured_parts(m: &Measured, sig_figs: usize, max_dp: Option<usize>)
    -> (String, String)
{
    let nominal: Rounded = round::round_f64(m.nominal(), sig_figs);
    let spread: Rounded =
        if m.spread() < find_sig_figs_significance(m.nominal(), sig_figs).abs()
        {
            Rounded::Float(0.0)
        } else {
            round::round_f64(m.spread(), sig_figs)
        };
    let nominal_str: String = cap_decimals(
        group_thousands(&nominal.to_string()),
        nominal.as_f64(),
        max_dp,
    );
    let spread_str: String =
        align_spread(&nominal_str, group_thousands(&spread.to_string()));
    return (nominal_str, spread_str);
}

// spread decimals may not exceed the nominal's; excess is cut, not rounded
fn align_spread(nominal: &str, spread: String) -> String {
    let ndp: usize = decimals(nominal);
    if decimals(&spread) <= ndp {
        return spread;
    }
    return match spread.find('.') {
        Some(dot) if !nominal.contains('.') => spread[..dot].to_string(),
        Some(dot) => spread[..dot + 1 + ndp].to_string(),
        None => spread,
    };
}

fn decimals(s: &str) -> usize {
    s.find('.').map(|dot| s.len() - dot - 1).unwrap_or(0)
}

/// Group integer digits in threes, leaving any fractional part alone.
fn group_thousands(repr: &str) -> String {
    let (sign, body): (&str, &str) = match repr.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", repr),
    };
    let (int_part, frac_part): (&str, &str) = match body.find('.') {
        Some(dot) => (&body[..dot], &body[dot..]),
        None => (body, ""),
    };
    let n: usize = int_part.len();
    let mut grouped: String = String::with_capacity(repr.len() + 2 * (n / 3));
    grouped.push_str(sign);
    for (k, c) in int_part.chars().enumerate() {
        if k > 0 && (n - k) % 3 == 0 {
            grouped.push_str(SEPARATOR);
        }
        grouped.push(c);
    }
    grouped.push_str(frac_part);
    return grouped;
}

// the cap truncates rather than rounding a second time; a nonzero value
// entirely below the cap's resolution becomes a "<" marker instead of a
// misleading row of zeros
fn cap_decimals(rendered: String, x: f64, max_dp: Option<usize>) -> String {
    let Some(dp) = max_dp else { return rendered };
    let resolution: f64 = 10.0_f64.powi(-(dp as i32));
    if x != 0.0 && x.abs() < resolution {
        let threshold: f64 = if x < 0.0 { -resolution } else { resolution };
        return format!("<{:.*}", dp, threshold);
    }
    return match rendered.find('.') {
        Some(dot) if dp == 0 => rendered[..dot].to_string(),
        Some(dot) => {
            let end: usize = rendered.len().min(dot + 1 + dp);
            rendered[..end].to_string()
        },
        None => rendered,
    };
}

/// Abbreviate a large number with a magnitude word.
///
/// The tier is picked from the base-10 exponent in steps of three, clamped
/// to the largest known tier; magnitudes below 10,000 render plain even
/// when a tier would apply.
///
/// ```
/// # use texval::display::num2word;
/// assert_eq!(num2word(12300.0), "12.3 thousand");
/// assert_eq!(num2word(1230.0), r"1\,230");
/// assert_eq!(num2word(-1230000000.0), "-1.23 billion");
/// ```
pub fn num2word(n: f64) -> String {
    const TIERS: [&str; 5] = ["", "thousand", "million", "billion", "trillion"];
    if n.abs() < 10_000.0 {
        return group_thousands(&round::round_f64(n, DEFAULT_SIG_FIGS).to_string());
    }
    let tier: usize =
        ((n.abs().log10() / 3.0).floor() as usize).min(TIERS.len() - 1);
    let scaled: Rounded =
        round::round_f64(n / 1000.0_f64.powi(tier as i32), DEFAULT_SIG_FIGS);
    return format!("{} {}", group_thousands(&scaled.to_string()), TIERS[tier]);
}

/// Trim text to at most `max_length` characters at a word boundary.
///
/// The cut happens at the last space before `max_length`, provided it lies
/// past the halfway point; otherwise the text comes back whole. Non-text
/// values pass through unchanged.
pub fn try_shorten(value: &Value, max_length: usize) -> Value {
    return match value {
        Value::Text(s) => Value::Text(shorten(s, max_length).to_string()),
        other => other.clone(),
    };
}

fn shorten(s: &str, max_length: usize) -> &str {
    if s.len() <= max_length {
        return s;
    }
    let cut: Option<usize> = s.char_indices()
        .filter(|&(k, c)| c == ' ' && k < max_length)
        .map(|(k, _)| k)
        .last();
    return match cut {
        Some(k) if k > max_length / 2 => shorten(&s[..k], max_length),
        _ => s,
    };
}

/// Format `name` and `value` into the ordered list of definition entries to
/// persist: zero or more auxiliary entries (derived names) followed by the
/// primary one.
///
/// All entries are produced before anything is written anywhere, so a
/// formatting failure can never leave a partial set behind.
pub fn format_entries(
    name: &str,
    value: &Value,
    style: Style,
    sig_figs: usize,
    max_dp: Option<usize>,
) -> DisplayResult<Vec<(String, String)>> {
    let mut entries: Vec<(String, String)> = Vec::with_capacity(2);
    match (style, value) {
        (Style::Default, Value::Measured(m)) => {
            entries.push((
                format!("{}Nominal", name),
                display_num(&Value::Float(m.nominal()), sig_figs, max_dp)?,
            ));
            entries.push((
                name.to_string(),
                display_measured(m, sig_figs, max_dp),
            ));
        },
        (Style::Default, Value::Date(d)) => {
            entries.push((
                format!("{}MonthYear", name),
                d.format("%B %Y").to_string(),
            ));
            entries.push((name.to_string(), d.format("%Y-%m-%d").to_string()));
        },
        (Style::Default, Value::Text(s)) => {
            entries.push((name.to_string(), s.clone()));
        },
        (Style::Default, _) => {
            entries.push((
                name.to_string(),
                display_num(value, sig_figs, max_dp)?,
            ));
        },
        (Style::Plain, _) => {
            entries.push((name.to_string(), plain_str(value)));
        },
        (Style::Percent, _) | (Style::BarePercent, _) => {
            let suffix: &str =
                if style == Style::Percent { r"\%" } else { "" };
            match value {
                Value::Int(n) => {
                    let scaled: Value = Value::Int(n * 100);
                    entries.push((
                        name.to_string(),
                        format!(
                            "{}{}",
                            display_num(&scaled, sig_figs, max_dp)?,
                            suffix,
                        ),
                    ));
                },
                Value::Float(x) => {
                    let scaled: Value = Value::Float(x * 100.0);
                    entries.push((
                        name.to_string(),
                        format!(
                            "{}{}",
                            display_num(&scaled, sig_figs, max_dp)?,
                            suffix,
                        ),
                    ));
                },
                Value::Measured(m) => {
                    let scaled: Measured =
                        Measured::new(m.nominal() * 100.0, m.spread() * 100.0);
                    entries.push((
                        format!("{}Nominal", name),
                        format!(
                            "{}{}",
                            display_num(
                                &Value::Float(scaled.nominal()),
                                sig_figs,
                                max_dp,
                            )?,
                            suffix,
                        ),
                    ));
                    let (nominal, spread): (String, String) =
                        measured_parts(&scaled, sig_figs, max_dp);
                    entries.push((
                        name.to_string(),
                        format!(r"${} \pm {}{}$", nominal, spread, suffix),
                    ));
                },
                other => {
                    return Err(DisplayError::NotAPercentage(other.kind()));
                },
            }
        },
        (Style::Small, Value::Int(n)) => {
            entries.push((
                name.to_string(),
                format!(r"\num{{{}}}", sci_str(*n as f64, sig_figs)),
            ));
        },
        (Style::Small, Value::Float(x)) => {
            entries.push((
                name.to_string(),
                format!(r"\num{{{}}}", sci_str(*x, sig_figs)),
            ));
        },
        (Style::Small, other) => {
            return Err(RoundError::UnsupportedType(other.kind()).into());
        },
        (Style::Days, _) => {
            let days: f64 = match value {
                Value::Int(n) => *n as f64,
                Value::Float(x) => *x,
                other => {
                    return Err(
                        RoundError::UnsupportedType(other.kind()).into()
                    );
                },
            };
            entries.push((
                format!("{}Years", name),
                display_num(&Value::Float(days / 365.0), sig_figs, max_dp)?,
            ));
            entries.push((
                name.to_string(),
                display_num(value, sig_figs, max_dp)?,
            ));
        },
    }
    return Ok(entries);
}

fn plain_str(value: &Value) -> String {
    return match value {
        Value::Int(n) => n.to_string(),
        Value::Float(x) => x.to_string(),
        Value::Measured(m) => {
            format!(r"${} \pm {}$", m.nominal(), m.spread())
        },
        Value::Date(d) => d.format("%Y-%m-%d").to_string(),
        Value::Text(s) => s.clone(),
    };
}

// %.Ng-style rendering: fixed form for moderate exponents, otherwise
// e-notation with a signed two-digit exponent
fn sci_str(x: f64, sig_figs: usize) -> String {
    if x == 0.0 {
        return "0".to_string();
    }
    let digits: usize = sig_figs.max(1) - 1;
    let e_form: String = format!("{:.*e}", digits, x);
    let (mantissa, exp_str): (&str, &str) =
        e_form.split_once('e').unwrap_or((e_form.as_str(), "0"));
    let exponent: i32 = exp_str.parse().unwrap_or(0);
    if exponent < -4 || exponent >= sig_figs.max(1) as i32 {
        return format!(
            "{}e{}{:02}",
            trim_zeros(mantissa),
            if exponent < 0 { "-" } else { "+" },
            exponent.abs(),
        );
    }
    let places: usize = (sig_figs.max(1) as i32 - 1 - exponent).max(0) as usize;
    return trim_zeros(&format!("{:.*}", places, x));
}

fn trim_zeros(s: &str) -> String {
    return if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s.to_string()
    };
}
