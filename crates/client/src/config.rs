use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub fps: u32,
    pub bot: bool,
    pub report_interval: Option<Duration>,
    pub scoreboard: bool,
    pub duration: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            fps: 144,
            bot: false,
            report_interval: Some(Duration::from_secs(1)),
            scoreboard: false,
            duration: None,
        }
    }
}

impl ClientConfig {
    pub fn frame_time(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.fps.max(1) as f64)
    }
}
