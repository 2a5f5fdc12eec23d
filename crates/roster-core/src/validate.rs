//! Field validation shared by contact writes and account registration.
//!
//! Validators append to a [`ValidationErrors`] accumulator rather than failing
//! fast, so a client sees every problem with a submission at once.

use crate::ValidationErrors;

pub const NAME_MAX_CHARS: usize = 100;
pub const PHONE_MAX_CHARS: usize = 20;
pub const EMAIL_MAX_CHARS: usize = 254;
pub const USERNAME_MAX_CHARS: usize = 150;

const REQUIRED: &str = "This field is required.";
const INVALID_EMAIL: &str = "Enter a valid email address.";

/// Trim `value` and record an error if it is empty or longer than `max`
/// characters. Returns the trimmed value.
pub fn required_text(
  errors: &mut ValidationErrors,
  field: &'static str,
  value: &str,
  max: usize,
) -> String {
  let value = value.trim();
  if value.is_empty() {
    errors.add(field, REQUIRED);
  } else {
    check_max_chars(errors, field, value, max);
  }
  value.to_owned()
}

/// Trim an optional value; blank collapses to `None`.
pub fn optional_text(value: Option<&str>) -> Option<String> {
  value
    .map(str::trim)
    .filter(|v| !v.is_empty())
    .map(str::to_owned)
}

/// Normalise an optional email and record an error if it is present but not a
/// syntactically valid address.
pub fn optional_email(
  errors: &mut ValidationErrors,
  field: &'static str,
  value: Option<&str>,
) -> Option<String> {
  let value = optional_text(value)?;
  if value.chars().count() > EMAIL_MAX_CHARS {
    check_max_chars(errors, field, &value, EMAIL_MAX_CHARS);
  } else if !is_valid_email(&value) {
    errors.add(field, INVALID_EMAIL);
  }
  Some(value)
}

/// Like [`optional_email`] but the address must be present.
pub fn required_email(
  errors: &mut ValidationErrors,
  field: &'static str,
  value: &str,
) -> String {
  match optional_email(errors, field, Some(value)) {
    Some(v) => v,
    None => {
      errors.add(field, REQUIRED);
      String::new()
    }
  }
}

/// Usernames: required, at most 150 characters, letters, digits and
/// `@ . + - _` only.
pub fn username(errors: &mut ValidationErrors, field: &'static str, value: &str) -> String {
  let value = required_text(errors, field, value, USERNAME_MAX_CHARS);
  let allowed = |c: char| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_');
  if !value.is_empty() && !value.chars().all(allowed) {
    errors.add(
      field,
      "Enter a valid username. This value may contain only letters, numbers, \
       and @/./+/-/_ characters.",
    );
  }
  value
}

fn check_max_chars(errors: &mut ValidationErrors, field: &'static str, value: &str, max: usize) {
  let len = value.chars().count();
  if len > max {
    errors.add(
      field,
      format!("Ensure this value has at most {max} characters (it has {len})."),
    );
  }
}

// ─── Email syntax ────────────────────────────────────────────────────────────

/// Syntactic email check: a dot-atom local part, `@`, and either a dotted
/// hostname with an alphabetic-or-punycode TLD, `localhost`, or a bracketed
/// address literal.
pub fn is_valid_email(value: &str) -> bool {
  let Some((local, domain)) = value.rsplit_once('@') else {
    return false;
  };
  is_valid_local_part(local) && is_valid_domain(domain)
}

fn is_valid_local_part(local: &str) -> bool {
  const ATEXT_SPECIALS: &str = "!#$%&'*+/=?^_`{|}~-";
  !local.is_empty()
    && local.split('.').all(|atom| {
      !atom.is_empty()
        && atom
          .chars()
          .all(|c| c.is_ascii_alphanumeric() || ATEXT_SPECIALS.contains(c))
    })
}

fn is_valid_domain(domain: &str) -> bool {
  if domain == "localhost" {
    return true;
  }
  if let Some(literal) = domain.strip_prefix('[').and_then(|d| d.strip_suffix(']')) {
    return literal.parse::<std::net::IpAddr>().is_ok()
      || literal
        .strip_prefix("IPv6:")
        .is_some_and(|v6| v6.parse::<std::net::Ipv6Addr>().is_ok());
  }

  let labels: Vec<&str> = domain.split('.').collect();
  let Some((tld, hosts)) = labels.split_last() else {
    return false;
  };
  if hosts.is_empty() {
    return false;
  }

  let label_ok = |label: &str| {
    (1..=63).contains(&label.len())
      && !label.starts_with('-')
      && !label.ends_with('-')
      && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
  };

  hosts.iter().all(|l| label_ok(l))
    && tld.len() >= 2
    && label_ok(tld)
    && (tld.chars().all(|c| c.is_ascii_alphabetic()) || tld.starts_with("xn--"))
}
