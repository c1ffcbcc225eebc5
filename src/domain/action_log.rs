// ==========================================
// 鲜果出口仓储 - 操作日志领域模型
// ==========================================
// 红线: 所有写入必须记录 (尽力而为,不阻塞业务)
// 对齐: action_log 表
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

// ==========================================
// ActionLog - 操作日志
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionLog {
    pub action_id: String,
    pub action_type: String,
    pub action_ts: NaiveDateTime,
    pub actor: String,

    /// 被操作记录的ID (点数记录或拒收记录)
    pub target_id: Option<String>,

    pub payload_json: Option<JsonValue>,
    pub detail: Option<String>,
}

// ==========================================
// ActionType - 操作类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionType {
    CreateCounting,
    DeleteCounting,
    ReconcileRejection,
}

impl ActionType {
    /// 转换为字符串 (用于数据库存储)
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::CreateCounting => "CreateCounting",
            ActionType::DeleteCounting => "DeleteCounting",
            ActionType::ReconcileRejection => "ReconcileRejection",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "CreateCounting" => Some(ActionType::CreateCounting),
            "DeleteCounting" => Some(ActionType::DeleteCounting),
            "ReconcileRejection" => Some(ActionType::ReconcileRejection),
            _ => None,
        }
    }
}

impl ActionLog {
    /// 创建新的操作日志,action_id 使用 UUID
    ///
    /// 操作人为空时记为 "system"
    pub fn new(action_type: ActionType, actor: Option<&str>, target_id: &str) -> Self {
        let actor = actor
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .unwrap_or("system");
        Self {
            action_id: uuid::Uuid::new_v4().to_string(),
            action_type: action_type.as_str().to_string(),
            action_ts: crate::db::now_timestamp(),
            actor: actor.to_string(),
            target_id: Some(target_id.to_string()),
            payload_json: None,
            detail: None,
        }
    }

    pub fn with_payload(mut self, payload: JsonValue) -> Self {
        self.payload_json = Some(payload);
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn action_type_enum(&self) -> Option<ActionType> {
        ActionType::from_str(&self.action_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_type_round_names() {
        for t in [
            ActionType::CreateCounting,
            ActionType::DeleteCounting,
            ActionType::ReconcileRejection,
        ] {
            assert_eq!(ActionType::from_str(t.as_str()), Some(t));
        }
        assert_eq!(ActionType::from_str("Recalc"), None);
    }

    #[test]
    fn test_new_defaults_actor() {
        let log = ActionLog::new(ActionType::DeleteCounting, Some("  "), "c-1");
        assert_eq!(log.actor, "system");
        assert_eq!(log.target_id.as_deref(), Some("c-1"));
        assert_eq!(log.action_type_enum(), Some(ActionType::DeleteCounting));
    }
}
