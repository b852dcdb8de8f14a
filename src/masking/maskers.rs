const MASK: char = '*';

/// Fixed run used for the interior of an email local part
const LOCAL_PART_FILL: &str = "***";

/// `123-45-6789` -> `***-**-6789`
pub fn mask_ssn(value: &str) -> String {
    let last_four: String = value
        .chars()
        .rev()
        .filter(char::is_ascii_digit)
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("***-**-{}", last_four)
}

/// `john.doe@mail.example.com` -> `j***e@****.*******.com`
pub fn mask_email(value: &str) -> String {
    let Some((local, domain)) = value.rsplit_once('@') else {
        return mask_fallback(value);
    };
    let mut out = mask_local_part(local);
    out.push('@');
    out.push_str(&mask_domain(domain));
    out
}

fn mask_local_part(local: &str) -> String {
    let chars: Vec<char> = local.chars().collect();
    match chars.as_slice() {
        [first, .., last] if chars.len() > 2 => {
            let mut out = String::with_capacity(local.len());
            out.push(*first);
            out.push_str(LOCAL_PART_FILL);
            out.push(*last);
            out
        }
        _ => mask_all(local)
    }
}

/// Every label but the top-level domain is hidden, dots stay in place
fn mask_domain(domain: &str) -> String {
    let labels: Vec<&str> = domain.split('.').collect();
    let last = labels.len().saturating_sub(1);
    labels
        .iter()
        .enumerate()
        .map(|(i, label)| if i == last { label.to_string() } else { mask_all(label) })
        .collect::<Vec<_>>()
        .join(".")
}

/// Every digit but the last two is masked; punctuation keeps its position
pub fn mask_phone(value: &str) -> String {
    let total = value.chars().filter(char::is_ascii_digit).count();
    let keep_from = total.saturating_sub(2);
    let mut seen = 0;
    value
        .chars()
        .map(|c| {
            if c.is_ascii_digit() {
                seen += 1;
                if seen <= keep_from { MASK } else { c }
            } else {
                c
            }
        })
        .collect()
}

/// Letters and digits become `*`, everything else is kept
pub fn mask_fallback(value: &str) -> String {
    value
        .chars()
        .map(|c| if c.is_alphanumeric() { MASK } else { c })
        .collect()
}

fn mask_all(value: &str) -> String {
    value.chars().map(|_| MASK).collect()
}
