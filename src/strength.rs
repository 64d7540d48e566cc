//! Password strength meter shown under password inputs.

/// Score in steps of 25: one step each for length, an uppercase letter, a digit and a symbol.
pub fn strength(password: &str) -> u8 {
    let checks = [
        password.chars().count() >= 8,
        password.chars().any(|c| c.is_ascii_uppercase()),
        password.chars().any(|c| c.is_ascii_digit()),
        password.chars().any(|c| !c.is_ascii_alphanumeric()),
    ];
    checks.into_iter().filter(|passed| *passed).count() as u8 * 25
}

/// Tailwind color for the meter bar.
pub fn strength_color(score: u8) -> &'static str {
    match score {
        0..=25 => "bg-red-500",
        26..=50 => "bg-orange-500",
        51..=75 => "bg-yellow-500",
        _ => "bg-green-500",
    }
}
