//! Entity → DTO conventions
//!
//! Entities never cross the HTTP boundary directly. Each entity implements
//! [`ToDto`]; slices and vectors of entities convert in one call through
//! [`ToDtos`].

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Fields every DTO carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AbstractDto {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Conversion from a persisted entity to its boundary representation.
pub trait ToDto {
    type Dto: Serialize;

    fn to_dto(&self) -> Self::Dto;
}

pub trait ToDtos<D> {
    fn to_dtos(&self) -> Vec<D>;
}

impl<E: ToDto> ToDtos<E::Dto> for [E] {
    fn to_dtos(&self) -> Vec<E::Dto> {
        self.iter().map(ToDto::to_dto).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Widget {
        id: Uuid,
        label: &'static str,
    }

    #[derive(Debug, PartialEq, Serialize)]
    struct WidgetDto {
        id: Uuid,
        label: String,
    }

    impl ToDto for Widget {
        type Dto = WidgetDto;

        fn to_dto(&self) -> WidgetDto {
            WidgetDto {
                id: self.id,
                label: self.label.to_uppercase(),
            }
        }
    }

    #[test]
    fn test_to_dtos_preserves_order() {
        let widgets = vec![
            Widget { id: Uuid::new_v4(), label: "a" },
            Widget { id: Uuid::new_v4(), label: "b" },
        ];

        let dtos = widgets.to_dtos();
        assert_eq!(dtos.len(), 2);
        assert_eq!(dtos[0].id, widgets[0].id);
        assert_eq!(dtos[0].label, "A");
        assert_eq!(dtos[1].label, "B");
    }

    #[test]
    fn test_to_dtos_empty() {
        let widgets: Vec<Widget> = Vec::new();
        assert!(widgets.to_dtos().is_empty());
    }

    #[test]
    fn test_abstract_dto_is_camel_case() {
        let now = Utc::now();
        let dto = AbstractDto {
            id: Uuid::nil(),
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&dto).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
    }
}
