//! AuthService trait 定義
//!
//! 署名付きトークンの発行と検証。コアはハンドシェイク時に `verify` だけを呼び、
//! 資格情報そのものは保持しない。

use async_trait::async_trait;

use super::{AuthError, Identity};

/// 署名済みの不透明なトークン
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityToken(String);

impl IdentityToken {
    pub fn new(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// 認証済みユーザーのトークンを発行
    fn issue(&self, identity: &Identity) -> Result<IdentityToken, AuthError>;

    /// トークンを検証し、身元を返す
    async fn verify(&self, token: &str) -> Result<Identity, AuthError>;
}
