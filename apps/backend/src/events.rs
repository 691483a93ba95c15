//! # Domain Events
//!
//! Events emitted after a successful commit and the sink they go to.
//!
//! ## Topics
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Event               Topic (prefix "sales")        Emitted by          │
//! │  ─────────────────   ──────────────────────────    ──────────────────  │
//! │  SaleCreated         sales.sale.created            create_sale         │
//! │  SaleModified        sales.sale.modified           update_sale_status  │
//! │  SaleCancelled       sales.sale.cancelled          update_sale_status  │
//! │  ItemCancelled       sales.sale.item_cancelled     cancel_sale_item    │
//! │  UserRegistered      sales.user.registered         create_user         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The only sink here is [`LoggingEventPublisher`], which writes each event
//! as a structured log record. A broker-backed publisher implements the
//! same trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sales_core::{Sale, SaleStatus, User, UserRole};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info};

// =============================================================================
// Events
// =============================================================================

/// Something that happened to an aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    SaleCreated {
        sale_id: String,
        sale_number: String,
        customer_id: String,
        branch_id: String,
        total_amount_cents: i64,
        item_count: usize,
        occurred_at: DateTime<Utc>,
    },
    SaleModified {
        sale_id: String,
        sale_number: String,
        previous_status: SaleStatus,
        status: SaleStatus,
        occurred_at: DateTime<Utc>,
    },
    SaleCancelled {
        sale_id: String,
        sale_number: String,
        occurred_at: DateTime<Utc>,
    },
    ItemCancelled {
        sale_id: String,
        item_id: String,
        total_amount_cents: i64,
        occurred_at: DateTime<Utc>,
    },
    UserRegistered {
        user_id: String,
        username: String,
        email: String,
        role: UserRole,
        occurred_at: DateTime<Utc>,
    },
}

impl DomainEvent {
    /// Topic suffix; the publisher adds its prefix.
    pub fn topic(&self) -> &'static str {
        match self {
            DomainEvent::SaleCreated { .. } => "sale.created",
            DomainEvent::SaleModified { .. } => "sale.modified",
            DomainEvent::SaleCancelled { .. } => "sale.cancelled",
            DomainEvent::ItemCancelled { .. } => "sale.item_cancelled",
            DomainEvent::UserRegistered { .. } => "user.registered",
        }
    }

    pub fn sale_created(sale: &Sale) -> Self {
        DomainEvent::SaleCreated {
            sale_id: sale.id.clone(),
            sale_number: sale.sale_number.clone(),
            customer_id: sale.customer_id.clone(),
            branch_id: sale.branch_id.clone(),
            total_amount_cents: sale.total_amount_cents,
            item_count: sale.items.len(),
            occurred_at: sale.created_at,
        }
    }

    /// `SaleCancelled` when the sale ended up cancelled, `SaleModified`
    /// otherwise.
    pub fn sale_status_changed(sale: &Sale, previous_status: SaleStatus) -> Self {
        if sale.status == SaleStatus::Cancelled {
            DomainEvent::SaleCancelled {
                sale_id: sale.id.clone(),
                sale_number: sale.sale_number.clone(),
                occurred_at: sale.updated_at,
            }
        } else {
            DomainEvent::SaleModified {
                sale_id: sale.id.clone(),
                sale_number: sale.sale_number.clone(),
                previous_status,
                status: sale.status,
                occurred_at: sale.updated_at,
            }
        }
    }

    pub fn item_cancelled(sale: &Sale, item_id: &str) -> Self {
        DomainEvent::ItemCancelled {
            sale_id: sale.id.clone(),
            item_id: item_id.to_string(),
            total_amount_cents: sale.total_amount_cents,
            occurred_at: sale.updated_at,
        }
    }

    pub fn user_registered(user: &User) -> Self {
        DomainEvent::UserRegistered {
            user_id: user.id.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
            occurred_at: user.created_at,
        }
    }
}

// =============================================================================
// Publisher
// =============================================================================

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Failed to serialize event for {topic}: {source}")]
    Serialization {
        topic: String,
        #[source]
        source: serde_json::Error,
    },

    /// The sink refused or lost the event. Broker-backed publishers report
    /// this; the logging publisher cannot fail to deliver.
    #[error("Failed to deliver event to {topic}: {reason}")]
    Delivery { topic: String, reason: String },
}

/// Message sink for domain events.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, topic: &str, event: &DomainEvent) -> Result<(), PublishError>;
}

/// Writes every event to the log under `<prefix>.<topic>`.
#[derive(Debug, Clone)]
pub struct LoggingEventPublisher {
    prefix: String,
}

impl LoggingEventPublisher {
    pub fn new(prefix: impl Into<String>) -> Self {
        LoggingEventPublisher {
            prefix: prefix.into(),
        }
    }

    pub fn full_topic(&self, topic: &str) -> String {
        format!("{}.{}", self.prefix, topic)
    }
}

impl Default for LoggingEventPublisher {
    fn default() -> Self {
        LoggingEventPublisher::new("sales")
    }
}

#[async_trait]
impl EventPublisher for LoggingEventPublisher {
    async fn publish(&self, topic: &str, event: &DomainEvent) -> Result<(), PublishError> {
        let topic = self.full_topic(topic);

        let payload = serde_json::to_string(event).map_err(|source| {
            error!(%topic, error = %source, "Event serialization failed");
            PublishError::Serialization {
                topic: topic.clone(),
                source,
            }
        })?;

        info!(target: "sales::events", %topic, %payload, "Event published");
        Ok(())
    }
}

/// Publishes `event` on its own topic.
pub async fn publish_event(
    publisher: &dyn EventPublisher,
    event: &DomainEvent,
) -> Result<(), PublishError> {
    publisher.publish(event.topic(), event).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topics() {
        let event = DomainEvent::SaleCancelled {
            sale_id: "s1".to_string(),
            sale_number: "S-20240101-00000001".to_string(),
            occurred_at: Utc::now(),
        };
        assert_eq!(event.topic(), "sale.cancelled");

        let publisher = LoggingEventPublisher::new("shop");
        assert_eq!(publisher.full_topic(event.topic()), "shop.sale.cancelled");
    }

    #[test]
    fn test_event_serializes_with_type_tag() {
        let event = DomainEvent::ItemCancelled {
            sale_id: "s1".to_string(),
            item_id: "i1".to_string(),
            total_amount_cents: 2_700,
            occurred_at: Utc::now(),
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "item_cancelled");
        assert_eq!(json["total_amount_cents"], 2_700);
    }

    #[tokio::test]
    async fn test_logging_publisher_accepts_events() {
        let publisher = LoggingEventPublisher::default();
        let event = DomainEvent::UserRegistered {
            user_id: "u1".to_string(),
            username: "ana".to_string(),
            email: "ana@shop.com".to_string(),
            role: UserRole::Manager,
            occurred_at: Utc::now(),
        };

        assert!(publish_event(&publisher, &event).await.is_ok());
    }
}
