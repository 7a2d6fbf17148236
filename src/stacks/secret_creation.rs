//! Standalone Secrets Manager test secret

use crate::config::Config;
use anyhow::Result;
use serde_json::json;
use stackkit::{App, Attrs};

pub const NAME: &str = "secret-creation";
const SECTION: &str = "secret_creation";

pub fn secret_creation(app: &mut App, cfg: &Config) -> Result<()> {
    let stack = app.stack(NAME, cfg.env_target(SECTION)?)?;

    let template = json!({ "username": "jw", "phone": 123, "nickname": "dd" });
    stack.declare(
        "my-test-secret",
        "AWS::SecretsManager::Secret",
        Attrs::new().set("Name", "MyTestSecret").set(
            "GenerateSecretString",
            Attrs::new()
                .set("SecretStringTemplate", template.to_string())
                .set("GenerateStringKey", "password"),
        ),
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::tests::sample_config;

    #[test]
    fn test_declares_one_secret() {
        let cfg = Config::parse(sample_config()).unwrap();
        let mut app = App::new();

        secret_creation(&mut app, &cfg).unwrap();
        assert_eq!(app.get(NAME).unwrap().resource_count(), 1);
    }
}
