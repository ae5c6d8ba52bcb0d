use hashbrown::HashMap;

use crate::error::{LooperError, Result};
use crate::interface::PipelineInterface;
use crate::sample::AttributeSource;

enum ArgValue<'a> {
    Bare,
    Value(&'a str),
    Missing,
    NullWithoutDefault,
}

/// Build the command-line argument string a pipeline receives for a sample.
///
/// Required arguments come first, then optional ones, each in declared
/// order. A flag mapped to a null attribute name is emitted bare. A
/// present-but-empty attribute falls back to `defaults`.
///
/// # Arguments
///
/// * `iface` - The pipeline interface declaring the argument maps.
/// * `sample` - Anything exposing sample attributes.
/// * `defaults` - Substitute values for null attributes, by attribute name.
///
/// # Returns
///
/// A `" {flag} {value}"` sequence; the leading space is left for callers.
///
/// # Example
///
/// ``` rust, no_run
/// let argtext = build_argstring(&iface, &sample, &project.defaults).unwrap();
///
/// assert_eq!(argtext, " --sample-name frog_1 --genome hg38 --single");
/// ```
pub fn build_argstring<S: AttributeSource>(
    iface: &PipelineInterface,
    sample: &S,
    defaults: &HashMap<String, String>,
) -> Result<String> {
    let mut argtext = String::new();

    for (flag, attr) in iface.arguments.iter() {
        match resolve(attr.as_deref(), sample, defaults) {
            ArgValue::Bare => push_flag(&mut argtext, flag, None),
            ArgValue::Value(value) => push_flag(&mut argtext, flag, Some(value)),
            ArgValue::Missing => {
                return Err(LooperError::MissingRequiredAttribute {
                    pipeline: iface.key.clone(),
                    flag: flag.to_string(),
                    attribute: attr.clone().unwrap_or_default(),
                })
            }
            ArgValue::NullWithoutDefault => {
                return Err(LooperError::NoDefaultForNullAttribute {
                    pipeline: iface.key.clone(),
                    flag: flag.to_string(),
                    attribute: attr.clone().unwrap_or_default(),
                })
            }
        }
    }

    for (flag, attr) in iface.optional_arguments.iter() {
        match resolve(attr.as_deref(), sample, defaults) {
            ArgValue::Bare => push_flag(&mut argtext, flag, None),
            ArgValue::Value(value) => push_flag(&mut argtext, flag, Some(value)),
            ArgValue::Missing | ArgValue::NullWithoutDefault => {
                log::debug!(
                    "DEBUG: skipping optional argument '{}' of {}: no value for '{}'",
                    flag,
                    iface.key,
                    attr.as_deref().unwrap_or_default()
                );
            }
        }
    }

    Ok(argtext)
}

fn resolve<'a, S: AttributeSource>(
    attr: Option<&str>,
    sample: &'a S,
    defaults: &'a HashMap<String, String>,
) -> ArgValue<'a> {
    let Some(attr) = attr else {
        return ArgValue::Bare;
    };

    if !sample.has_attribute(attr) {
        return ArgValue::Missing;
    }

    match sample.get_attribute(attr) {
        Some(value) if !value.is_empty() => ArgValue::Value(value),
        _ => match defaults.get(attr) {
            Some(default) => ArgValue::Value(default.as_str()),
            None => ArgValue::NullWithoutDefault,
        },
    }
}

fn push_flag(argtext: &mut String, flag: &str, value: Option<&str>) {
    argtext.push(' ');
    argtext.push_str(flag);

    if let Some(value) = value {
        argtext.push(' ');
        argtext.push_str(value);
    }
}
