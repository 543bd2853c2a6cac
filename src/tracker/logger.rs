use std::time::{Duration, Instant};

use crate::pose::Pose;

use log::info;

mod consts {
    pub const MIN_INTERVAL: std::time::Duration = std::time::Duration::from_millis(20);
}

/// Rate-limited pose reports on the `info` level.
pub struct PoseLogger {
    interval: Duration,
    next_log: Option<Instant>,

    pub log_position_rotation: bool,
    pub log_rms: bool,
    pub log_matrix: bool,
}

impl PoseLogger {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(consts::MIN_INTERVAL),
            next_log: None,
            log_position_rotation: true,
            log_rms: true,
            log_matrix: false,
        }
    }

    /// Returns whether a report was written for this tick.
    pub fn log(&mut self, now: Instant, tool: &str, pose: &Pose) -> bool {
        if !pose.valid {
            return false;
        }
        if matches!(self.next_log, Some(next) if now < next) {
            return false;
        }
        self.next_log = Some(now + self.interval);

        if self.log_position_rotation {
            let p = pose.position();
            let (roll, pitch, yaw) = pose.rotation().euler_angles();
            info!(
                "[{}] pos=({:.3},{:.3},{:.3}) rpy=({:.1},{:.1},{:.1})",
                tool,
                p.x,
                p.y,
                p.z,
                roll.to_degrees(),
                pitch.to_degrees(),
                yaw.to_degrees()
            );
        }
        if self.log_rms {
            info!("[{}] rms={:.4} m", tool, pose.rms);
        }
        if self.log_matrix {
            info!("[{}] {}", tool, pose.world_from_tool.to_homogeneous());
        }
        true
    }
}
