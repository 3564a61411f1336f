use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};

pub fn random_alpha_string(len: usize) -> String {
    thread_rng().sample_iter(&Alphanumeric).take(len).collect()
}

#[test]
fn random_alpha_string_has_requested_length() {
    let code = random_alpha_string(12);
    assert_eq!(code.len(), 12);
    assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
}
