//! # Forgot Password Service
//!
//! OTP-based password reset: mail a six-digit code, verify it against the
//! requesting user, then overwrite the password.

use std::sync::Arc;

use chrono::{Duration, Utc};
use rand::Rng;

use crate::auth::models::{normalize_email, ChangePassword};
use crate::auth::password::hash_password;
use crate::database::models::{ForgotPassword, User};
use crate::error::{AppError, AppResult};
use crate::repositories::{ForgotPasswordRepository, UserRepository};
use crate::services::email_service::{MailBody, Mailer};

const OTP_RANGE: std::ops::RangeInclusive<i32> = 100_000..=999_999;

pub struct ForgotPasswordService {
    users: Arc<dyn UserRepository>,
    otps: Arc<dyn ForgotPasswordRepository>,
    mailer: Arc<dyn Mailer>,
    otp_ttl: Duration,
}

impl ForgotPasswordService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        otps: Arc<dyn ForgotPasswordRepository>,
        mailer: Arc<dyn Mailer>,
        otp_ttl: Duration,
    ) -> Self {
        Self {
            users,
            otps,
            mailer,
            otp_ttl,
        }
    }

    async fn find_user(&self, email: &str) -> AppResult<User> {
        let email = normalize_email(email);
        self.users
            .find_by_email(&email)
            .await?
            .ok_or(AppError::UserNotFound(email))
    }

    /// Issue a fresh OTP for the user and mail it. Any earlier OTP is replaced.
    pub async fn verify_mail(&self, email: &str) -> AppResult<String> {
        let user = self.find_user(email).await?;
        let otp = generate_otp();

        self.otps
            .save(ForgotPassword {
                fpid: None,
                otp,
                expiration_time: Utc::now() + self.otp_ttl,
                user_id: user.user_id,
            })
            .await?;

        self.mailer
            .send(MailBody {
                to: user.email.clone(),
                subject: "OTP for Forgot Password request".to_string(),
                text: format!("This is the OTP for your Forgot Password request : {}", otp),
            })
            .await?;

        tracing::info!(user_id = user.user_id, "Issued password reset OTP");
        Ok("Email sent for verification!".to_string())
    }

    /// The OTP must belong to the user behind `email`; an expired OTP is discarded
    pub async fn verify_otp(&self, otp: i32, email: &str) -> AppResult<String> {
        let user = self.find_user(email).await?;

        let record = self
            .otps
            .find_by_otp_and_user(otp, user.user_id)
            .await?
            .ok_or(AppError::InvalidOtp)?;

        if record.is_expired_at(Utc::now()) {
            if let Some(fpid) = record.fpid {
                self.otps.delete(fpid).await?;
            }
            return Err(AppError::OtpExpired);
        }

        Ok("OTP verified!".to_string())
    }

    pub async fn change_password(&self, email: &str, change: ChangePassword) -> AppResult<String> {
        if change.password != change.repeat_password {
            return Err(AppError::PasswordMismatch);
        }
        let user = self.find_user(email).await?;

        let hash = hash_password(&change.password)?;
        self.users.update_password(&user.email, &hash).await?;
        self.otps.delete_for_user(user.user_id).await?;

        tracing::info!(user_id = user.user_id, "Password changed");
        Ok("Password has been changed!".to_string())
    }
}

fn generate_otp() -> i32 {
    rand::thread_rng().gen_range(OTP_RANGE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::verify_password;
    use crate::database::models::{NewUser, Role};
    use crate::repositories::memory::{InMemoryForgotPasswordRepository, InMemoryUserRepository};
    use crate::services::email_service::testing::RecordingMailer;

    struct Fixture {
        users: Arc<InMemoryUserRepository>,
        otps: Arc<InMemoryForgotPasswordRepository>,
        mailer: Arc<RecordingMailer>,
        service: ForgotPasswordService,
    }

    async fn fixture() -> Fixture {
        let users = Arc::new(InMemoryUserRepository::default());
        let otps = Arc::new(InMemoryForgotPasswordRepository::default());
        let mailer = Arc::new(RecordingMailer::default());
        for (email, username) in [("alice@example.com", "alice"), ("bob@example.com", "bob")] {
            users
                .insert(NewUser {
                    name: username.to_string(),
                    email: email.to_string(),
                    username: username.to_string(),
                    password_hash: hash_password("old-password").unwrap(),
                    role: Role::User,
                })
                .await
                .unwrap();
        }
        let service = ForgotPasswordService::new(
            users.clone(),
            otps.clone(),
            mailer.clone(),
            Duration::seconds(70),
        );
        Fixture {
            users,
            otps,
            mailer,
            service,
        }
    }

    async fn user_id(f: &Fixture, email: &str) -> i32 {
        f.users.find_by_email(email).await.unwrap().unwrap().user_id
    }

    #[test]
    fn otp_has_six_digits() {
        for _ in 0..100 {
            assert!(OTP_RANGE.contains(&generate_otp()));
        }
    }

    #[tokio::test]
    async fn verify_mail_stores_and_sends_otp() {
        let f = fixture().await;
        let message = f.service.verify_mail("alice@example.com").await.unwrap();
        assert_eq!(message, "Email sent for verification!");

        let record = f.otps.for_user(user_id(&f, "alice@example.com").await).unwrap();
        let sent = f.mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "alice@example.com");
        assert!(sent[0].text.ends_with(&record.otp.to_string()));
    }

    #[tokio::test]
    async fn verify_mail_for_unknown_email_fails() {
        let f = fixture().await;
        let err = f.service.verify_mail("nobody@example.com").await.unwrap_err();
        assert!(matches!(err, AppError::UserNotFound(_)));
        assert!(f.mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn otp_verifies_only_for_its_owner() {
        let f = fixture().await;
        f.service.verify_mail("alice@example.com").await.unwrap();
        let otp = f.otps.for_user(user_id(&f, "alice@example.com").await).unwrap().otp;

        assert_eq!(f.service.verify_otp(otp, "alice@example.com").await.unwrap(), "OTP verified!");
        assert!(matches!(
            f.service.verify_otp(otp, "bob@example.com").await,
            Err(AppError::InvalidOtp)
        ));
    }

    #[tokio::test]
    async fn expired_otp_is_removed() {
        let f = fixture().await;
        f.service.verify_mail("alice@example.com").await.unwrap();
        let alice = user_id(&f, "alice@example.com").await;
        let otp = f.otps.for_user(alice).unwrap().otp;
        f.otps.set_expiration(alice, Utc::now() - Duration::seconds(1));

        assert!(matches!(
            f.service.verify_otp(otp, "alice@example.com").await,
            Err(AppError::OtpExpired)
        ));
        assert!(f.otps.for_user(alice).is_none());
    }

    #[tokio::test]
    async fn reset_flow_accepts_mixed_case_email() {
        let f = fixture().await;
        f.service.verify_mail(" Alice@Example.COM").await.unwrap();
        let otp = f.otps.for_user(user_id(&f, "alice@example.com").await).unwrap().otp;

        assert_eq!(f.service.verify_otp(otp, "ALICE@example.com").await.unwrap(), "OTP verified!");
        f.service
            .change_password(
                "Alice@Example.com",
                ChangePassword {
                    password: "new-password".to_string(),
                    repeat_password: "new-password".to_string(),
                },
            )
            .await
            .unwrap();
        let hash = f.users.password_of("alice@example.com").unwrap();
        assert!(verify_password("new-password", &hash).unwrap());
    }

    #[tokio::test]
    async fn change_password_requires_matching_repeat() {
        let f = fixture().await;
        let err = f
            .service
            .change_password(
                "alice@example.com",
                ChangePassword {
                    password: "new-password".to_string(),
                    repeat_password: "typo-password".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::PasswordMismatch));
    }

    #[tokio::test]
    async fn change_password_overwrites_hash_and_clears_otp() {
        let f = fixture().await;
        f.service.verify_mail("alice@example.com").await.unwrap();

        let message = f
            .service
            .change_password(
                "alice@example.com",
                ChangePassword {
                    password: "new-password".to_string(),
                    repeat_password: "new-password".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(message, "Password has been changed!");

        let hash = f.users.password_of("alice@example.com").unwrap();
        assert!(verify_password("new-password", &hash).unwrap());
        assert!(f.otps.for_user(user_id(&f, "alice@example.com").await).is_none());
    }
}
