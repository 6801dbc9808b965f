//! 注册 OTP 冷却倒计时
//!
//! 后端返回 "Please wait N seconds..." 时启动，之后每秒本地递减一次，
//! 到期前不再向后端确认。倒计时期间禁止重新提交。

pub use crate::error::parse_wait_seconds;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cooldown {
    remaining: u32,
}

impl Cooldown {
    pub fn start(seconds: u32) -> Self {
        Self { remaining: seconds }
    }

    /// 递减一秒，返回递减后是否仍在等待
    pub fn tick(&mut self) -> bool {
        self.remaining = self.remaining.saturating_sub(1);
        self.is_waiting()
    }

    pub fn is_waiting(&self) -> bool {
        self.remaining > 0
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// 等待期间的提示；到期后为 `None`
    pub fn message(&self) -> Option<String> {
        self.is_waiting().then(|| {
            format!(
                "Please wait {} seconds before requesting a new OTP",
                self.remaining
            )
        })
    }
}
