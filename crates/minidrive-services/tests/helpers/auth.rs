use minidrive_core::Identity;
use minidrive_services::DriveSession;

pub const TEST_SECRET: &str = "correct horse battery staple";

/// Register `user_name` and sign the session in as that user
pub async fn sign_in_as(session: &mut DriveSession, user_name: &str) -> Identity {
    session
        .sign_up(user_name, TEST_SECRET, TEST_SECRET)
        .await
        .expect("Failed to register test user");
    session
        .log_in(user_name, TEST_SECRET)
        .await
        .expect("Failed to log in test user")
}

/// Sign in as an already registered user
pub async fn log_in_as(session: &mut DriveSession, user_name: &str) -> Identity {
    session
        .log_in(user_name, TEST_SECRET)
        .await
        .expect("Failed to log in test user")
}
