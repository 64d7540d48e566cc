pub fn session(session_id: &str) -> String {
    format!("sess:{session_id}")
}

pub fn password_reset(token: &str) -> String {
    format!("pwreset:{token}")
}
