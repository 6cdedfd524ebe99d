use crate::common::{TestApp, ai_config_with_fake_openai, routes};

mod provider_listing {
    use super::*;

    #[tokio::test]
    async fn lists_every_provider_with_flags() {
        let app = TestApp::spawn_with(ai_config_with_fake_openai()).await;

        let res = app.get(routes::PROVIDERS).await;
        assert_eq!(res.status, 200);

        let listed = res.body.as_array().unwrap();
        assert_eq!(listed.len(), 3);

        let openai = listed.iter().find(|p| p["name"] == "openai").unwrap();
        assert_eq!(openai["configured"], true);
        assert_eq!(openai["default"], true);
        assert_eq!(openai["model"], "gpt-4");

        let grok = listed.iter().find(|p| p["name"] == "grok").unwrap();
        assert_eq!(grok["configured"], false);
        assert_eq!(grok["default"], false);
    }
}

mod provider_testing {
    use super::*;

    #[tokio::test]
    async fn unknown_provider_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app.post_empty(&routes::provider_test("claude")).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "UNKNOWN_PROVIDER");
    }

    #[tokio::test]
    async fn unconfigured_provider_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app.post_empty(&routes::provider_test("grok")).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "PROVIDER_NOT_CONFIGURED");
    }

    #[tokio::test]
    async fn bad_credential_reports_an_unsuccessful_test() {
        // The key is fake, so the round-trip fails; that is a 200 with
        // success=false, not an HTTP error.
        let app = TestApp::spawn_with(ai_config_with_fake_openai()).await;

        let res = app.post_empty(&routes::provider_test("openai")).await;

        assert_eq!(res.status, 200, "test endpoint failed: {}", res.text);
        assert_eq!(res.body["provider"], "openai");
        assert_eq!(res.body["success"], false);
        assert!(!res.body["message"].as_str().unwrap().is_empty());
    }
}
