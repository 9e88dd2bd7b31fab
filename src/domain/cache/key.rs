//! Cache fingerprint generation

use sha2::{Digest, Sha256};

use crate::domain::model::{GenerationParams, ProviderIdentity};
use crate::domain::test_case::TestCaseId;

/// Deterministic hash identifying a unique
/// (provider identity, test case, generation parameters) triple.
///
/// Every field that can change the model's output or its scoring must be
/// part of the hashed material, so semantically different requests can never
/// collide. Cost rates are billing metadata and are deliberately excluded.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn compute(
        identity: &ProviderIdentity,
        test_case_id: &TestCaseId,
        params: &GenerationParams,
    ) -> Self {
        // Fixed field order; components joined with an unambiguous separator.
        let material = format!(
            "model={}|kind={}|test={}|temperature={}|max_tokens={}",
            identity.model_name,
            identity.kind,
            test_case_id,
            params.temperature,
            params.max_tokens,
        );

        let digest = Sha256::digest(material.as_bytes());
        Self(hex::encode(digest))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::ProviderKind;

    fn identity(model: &str) -> ProviderIdentity {
        ProviderIdentity::new(model, ProviderKind::OpenAi, 0.005, 0.015)
    }

    #[test]
    fn test_identical_requests_share_a_fingerprint() {
        let id = TestCaseId::new("fa-001");
        let params = GenerationParams::new(0.7, 1000);

        let a = Fingerprint::compute(&identity("gpt-4o"), &id, &params);
        let b = Fingerprint::compute(&identity("gpt-4o"), &id, &params);
        assert_eq!(a, b);
    }

    #[test]
    fn test_temperature_changes_fingerprint() {
        let id = TestCaseId::new("fa-001");

        let a = Fingerprint::compute(&identity("gpt-4o"), &id, &GenerationParams::new(0.0, 1000));
        let b = Fingerprint::compute(&identity("gpt-4o"), &id, &GenerationParams::new(0.7, 1000));
        assert_ne!(a, b);
    }

    #[test]
    fn test_model_and_case_change_fingerprint() {
        let params = GenerationParams::default();

        let a = Fingerprint::compute(&identity("gpt-4o"), &TestCaseId::new("fa-001"), &params);
        let b = Fingerprint::compute(&identity("gpt-4o-mini"), &TestCaseId::new("fa-001"), &params);
        let c = Fingerprint::compute(&identity("gpt-4o"), &TestCaseId::new("fa-002"), &params);

        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_cost_rates_do_not_affect_fingerprint() {
        let id = TestCaseId::new("fa-001");
        let params = GenerationParams::default();

        let cheap = ProviderIdentity::new("gpt-4o", ProviderKind::OpenAi, 0.001, 0.002);
        let pricey = ProviderIdentity::new("gpt-4o", ProviderKind::OpenAi, 0.03, 0.06);

        assert_eq!(
            Fingerprint::compute(&cheap, &id, &params),
            Fingerprint::compute(&pricey, &id, &params)
        );
    }
}
