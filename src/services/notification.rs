//! Desktop notifications through `notify-send`

use std::future::Future;
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::alerts::{NotificationPermission, Notifier};
use crate::error::AlertError;

const NOTIFY_SEND: &str = "notify-send";

/// Sends desktop notifications with the freedesktop `notify-send` tool
#[derive(Debug, Clone, Copy)]
pub struct DesktopNotifier {
    permission: NotificationPermission,
}

impl DesktopNotifier {
    /// Check once whether notifications can be shown.
    ///
    /// Permission is granted only when notifications are enabled and
    /// `notify-send` is installed.
    pub async fn probe(enabled: bool) -> Self {
        if !enabled {
            info!("Desktop notifications disabled by configuration");
            return Self::with_permission(NotificationPermission::Denied);
        }

        let available = Command::new(NOTIFY_SEND)
            .arg("--version")
            .output()
            .await
            .map(|output| output.status.success())
            .unwrap_or(false);

        if available {
            info!("{} is available, desktop notifications enabled", NOTIFY_SEND);
            Self::with_permission(NotificationPermission::Granted)
        } else {
            warn!("{} is not available, desktop notifications disabled", NOTIFY_SEND);
            Self::with_permission(NotificationPermission::Denied)
        }
    }

    pub fn with_permission(permission: NotificationPermission) -> Self {
        Self { permission }
    }
}

impl Notifier for DesktopNotifier {
    fn permission(&self) -> NotificationPermission {
        self.permission
    }

    fn notify(
        &self,
        title: &str,
        body: &str,
    ) -> impl Future<Output = Result<(), AlertError>> + Send {
        let permission = self.permission;
        let title = title.to_string();
        let body = body.to_string();

        async move {
            if permission != NotificationPermission::Granted {
                return Err(AlertError::PermissionDenied);
            }

            debug!("Sending desktop notification: {}", title);
            let output = Command::new(NOTIFY_SEND)
                .args(["--app-name=multitimer", "--urgency=critical"])
                .arg(&title)
                .arg(&body)
                .output()
                .await
                .map_err(|e| {
                    AlertError::Backend(format!("failed to execute {}: {}", NOTIFY_SEND, e))
                })?;

            if !output.status.success() {
                let stderr = String::from_utf8_lossy(&output.stderr);
                return Err(AlertError::Backend(format!("{} failed: {}", NOTIFY_SEND, stderr)));
            }

            Ok(())
        }
    }
}
