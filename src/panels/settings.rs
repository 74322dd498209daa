use serde::{Deserialize, Serialize};

use crate::panels::Notice;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Dark,
    Light,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiUsage {
    pub text_tokens: u64,
    pub image_generations: u64,
    pub search_queries: u64,
    pub daily_limit: u64,
}

impl ApiUsage {
    /// Share of the daily limit used, rounded to the nearest percent.
    pub fn percentage(&self) -> u64 {
        if self.daily_limit == 0 {
            return 0;
        }
        let used = u128::from(self.text_tokens)
            + u128::from(self.image_generations)
            + u128::from(self.search_queries);
        let limit = u128::from(self.daily_limit);
        u64::try_from((used * 100 + limit / 2) / limit).unwrap_or(u64::MAX)
    }
}

/// Local preferences. No backend call.
pub struct SettingsPanel {
    pub theme: Theme,
    pub notifications: bool,
    pub auto_save: bool,
    response_length: u8,
    usage: Option<ApiUsage>,
    notices: Vec<Notice>,
}

impl SettingsPanel {
    pub fn new(usage: Option<ApiUsage>) -> Self {
        Self {
            theme: Theme::Dark,
            notifications: true,
            auto_save: true,
            response_length: 75,
            usage,
            notices: Vec::new(),
        }
    }

    pub fn response_length(&self) -> u8 {
        self.response_length
    }

    /// Clamped to 0..=100.
    pub fn set_response_length(&mut self, value: u8) {
        self.response_length = value.min(100);
    }

    pub fn usage(&self) -> Option<&ApiUsage> {
        self.usage.as_ref()
    }

    pub fn usage_percentage(&self) -> u64 {
        self.usage.map(|u| u.percentage()).unwrap_or(0)
    }

    pub fn export_data(&mut self) {
        self.notices.push(Notice::info(
            "Export Started",
            "Your data is being prepared for download",
        ));
    }

    pub fn clear_data(&mut self) {
        self.notices.push(Notice::error(
            "Data Cleared",
            "All local data has been removed",
        ));
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_percentage_rounds() {
        let usage = ApiUsage {
            text_tokens: 15750,
            image_generations: 8,
            search_queries: 12,
            daily_limit: 50000,
        };
        // 15770 / 50000 = 31.54%
        assert_eq!(SettingsPanel::new(Some(usage)).usage_percentage(), 32);
    }

    #[test]
    fn zero_limit_and_missing_usage_are_zero() {
        let usage = ApiUsage {
            text_tokens: 10,
            image_generations: 0,
            search_queries: 0,
            daily_limit: 0,
        };
        assert_eq!(usage.percentage(), 0);
        assert_eq!(SettingsPanel::new(None).usage_percentage(), 0);
    }

    #[test]
    fn huge_counters_do_not_overflow() {
        let usage = ApiUsage {
            text_tokens: u64::MAX,
            image_generations: u64::MAX,
            search_queries: 0,
            daily_limit: u64::MAX,
        };
        assert_eq!(usage.percentage(), 200);

        let over = ApiUsage { daily_limit: 1, ..usage };
        assert_eq!(over.percentage(), u64::MAX);
    }

    #[test]
    fn response_length_is_clamped() {
        let mut panel = SettingsPanel::new(None);
        panel.set_response_length(250);
        assert_eq!(panel.response_length(), 100);
    }
}
