use leptos::prelude::*;
use lettre::{
    Message,
    address::Address,
    error::Error,
    message::Mailbox,
    message::{MultiPart, SinglePart, header},
};

/// Password reset email with a one-time link.
pub fn password_reset(
    from: Mailbox,
    email_address: Address,
    link: &str,
    expiration_min: i64,
) -> Result<Message, Error> {
    let html = {
        let link = link.to_string();
        view! {
            <head>
                <title>"Reset your Math Mentor password"</title>
                <style type="text/css">
                    "* { font-family: Arial, Helvetica, sans-serif; }"
                    ".container { display: flex; flex-direction: column; }" ".button {"
                    "align-self: center;" "background: #7c3aed;" "color: #ffffff;"
                    "padding: 0.6rem 1.2rem;" "border-radius: 0.4rem;" "text-decoration: none;"
                    "font-weight: bold;" "margin: 0.6rem auto;" "}"
                </style>
            </head>
            <div class="container">
                <h2>"Reset your password"</h2>
                <p>"Hello,"</p>
                <p>"Someone asked to reset the password of your Math Mentor account."</p>
                <a class="button" href=link.clone()>
                    "Choose a new password"
                </a>
                <p>"Or paste this link into your browser: " {link}</p>
                <p>
                    "The link works once and expires in " {expiration_min}
                    " minutes. If you did not ask for this, you can ignore this email; your password stays the same."
                </p>
            </div>
        }
        .to_html()
    };

    // Plain text fallback.
    let plain_text = format!(
        r#"Reset your password

Hello,
Someone asked to reset the password of your Math Mentor account.

Choose a new password here:
{link}

The link works once and expires in {expiration_min} minutes. If you did not ask for this, you can ignore this email; your password stays the same.
"#
    );

    Message::builder()
        .from(from)
        .to(Mailbox::new(None, email_address))
        .subject("Reset your Math Mentor password")
        .multipart(
            MultiPart::alternative()
                .singlepart(
                    SinglePart::builder()
                        .header(header::ContentType::TEXT_PLAIN)
                        .body(plain_text),
                )
                .singlepart(
                    SinglePart::builder()
                        .header(header::ContentType::TEXT_HTML)
                        .body(html),
                ),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_carries_link_in_both_parts() {
        let message = password_reset(
            "Math Mentor <noreply@example.com>".parse().unwrap(),
            "parent@example.com".parse().unwrap(),
            "http://localhost:3000/reset-password?token=abc123",
            60,
        )
        .unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("To: parent@example.com"));
        assert!(raw.contains("Subject: Reset your Math Mentor password"));
        assert!(raw.contains("text/plain"));
        assert!(raw.contains("text/html"));
        assert!(raw.contains("reset-password"));
        assert!(raw.contains("abc123"));
    }
}
