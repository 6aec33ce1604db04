
use std::collections::HashSet;

pub const TOKEN_SCHEME_PREFIX: &str = "Token ";

#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    tokens: HashSet<String>,
}

impl CredentialStore {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens
                .into_iter()
                .map(Into::into)
                .filter(|t: &String| !t.is_empty())
                .collect(),
        }
    }

    pub fn is_valid(&self, token: &str) -> bool {
        !token.is_empty() && self.tokens.contains(token)
    }

    pub fn authorize(&self, header: Option<&str>) -> bool {
        header
            .and_then(extract_token)
            .is_some_and(|token| self.is_valid(token))
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

pub fn extract_token(header: &str) -> Option<&str> {
    header.strip_prefix(TOKEN_SCHEME_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> CredentialStore {
        CredentialStore::new(["servicio1_token123", "servicio2_token456"])
    }

    #[test]
    fn membership() {
        let creds = store();
        assert!(creds.is_valid("servicio1_token123"));
        assert!(!creds.is_valid("servicio3_token789"));
        assert!(!creds.is_valid(""));
        assert_eq!(creds.len(), 2);
    }

    #[test]
    fn empty_tokens_are_not_provisioned() {
        let creds = CredentialStore::new(["", "abc"]);
        assert_eq!(creds.len(), 1);
        assert!(!creds.is_valid(""));
    }

    #[test]
    fn authorize_requires_token_scheme() {
        let creds = store();
        assert!(creds.authorize(Some("Token servicio2_token456")));
        assert!(!creds.authorize(None));
        assert!(!creds.authorize(Some("")));
        assert!(!creds.authorize(Some("Token ")));
        assert!(!creds.authorize(Some("Bearer servicio2_token456")));
        assert!(!creds.authorize(Some("Tokenxservicio2_token456")));
        assert!(!creds.authorize(Some("servicio2_token456")));
        assert!(!creds.authorize(Some("Token servicio2_token456 ")));
    }
}
