#[cfg(test)]
mod tests {
    use anyhow::{bail, Result};
    use campus_kit::{AsyncExecutor, AsyncResource, AsyncState};
    use std::time::Duration;

    const LATENCY: Duration = Duration::from_millis(20);

    async fn fetch_testimonials() -> Result<Vec<String>> {
        tokio::time::sleep(LATENCY).await;
        Ok(vec!["Great instructors".to_string(), "Flexible schedule".to_string()])
    }

    async fn login(user: &str, password: &str) -> Result<String> {
        tokio::time::sleep(LATENCY).await;
        if user == "ana" && password == "secret" {
            Ok("token-123".to_string())
        } else {
            bail!("Invalid credentials")
        }
    }

    #[tokio::test]
    async fn test_delayed_producer_loads_then_settles() {
        let resource = AsyncResource::new(fetch_testimonials, ());
        let mut updates = resource.subscribe();

        let run = resource.mount();
        assert!(resource.state().loading);
        assert_eq!(resource.state().data, None);

        let settled = updates.wait_for(|s| !s.loading).await.unwrap().clone();
        assert_eq!(settled.data.as_ref().map(Vec::len), Some(2));
        assert_eq!(settled.error, None);
        run.await.unwrap();
    }

    #[tokio::test]
    async fn test_rejecting_producer_reports_message() {
        let resource = AsyncResource::new(|| login("ana", "wrong"), ());
        resource.mount().await.unwrap();

        assert_eq!(resource.state(), AsyncState::failed("Invalid credentials"));
    }

    #[tokio::test]
    async fn test_dropped_resource_ignores_late_result() {
        let resource = AsyncResource::new(fetch_testimonials, ());
        let mut updates = resource.subscribe();
        let run = resource.mount();
        updates.borrow_and_update();

        drop(resource);
        run.await.unwrap();

        // Sender is gone with the resource; nothing was published after loading
        assert!(updates.has_changed().is_err());
        assert!(updates.borrow().loading);
    }

    #[tokio::test]
    async fn test_executor_login_flow() {
        let executor = AsyncExecutor::new();

        let token = executor.execute(login("ana", "nope")).await;
        assert_eq!(token, None);
        assert_eq!(executor.error().as_deref(), Some("Invalid credentials"));
        assert!(!executor.is_loading());

        let token = executor.execute(login("ana", "secret")).await;
        assert_eq!(token.as_deref(), Some("token-123"));
        assert_eq!(executor.error(), None);
    }
}
