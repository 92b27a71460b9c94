use crate::catalog::Catalog;
use crate::error::{DeskError, Result};
use crate::types::{parse_tags, Item, ItemDraft, ItemKind};

/// Overlay form that creates one catalog item and hands it to whoever opened
/// it.
#[derive(Debug, Clone)]
pub struct CreationModal {
    kind: ItemKind,
    pub title: String,
    pub content: String,
    /// Raw comma-separated tag input.
    pub tags_input: String,
    open: bool,
}

impl CreationModal {
    pub fn new(kind: ItemKind) -> Self {
        Self {
            kind,
            title: String::new(),
            content: String::new(),
            tags_input: String::new(),
            open: true,
        }
    }

    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn can_submit(&self) -> bool {
        self.open && !self.title.trim().is_empty() && !self.content.trim().is_empty()
    }

    pub fn draft(&self) -> ItemDraft {
        ItemDraft::new(self.title.trim(), self.content.trim())
            .with_tags(parse_tags(&self.tags_input))
    }

    /// Post the item. On success `on_created` receives it and the modal
    /// closes; on failure the modal stays open with every field intact.
    pub fn submit(&mut self, catalog: &dyn Catalog, on_created: impl FnOnce(Item)) -> Result<()> {
        if !self.open {
            return Err(DeskError::user_input("This form is already closed."));
        }
        if !self.can_submit() {
            return Err(DeskError::user_input("Title and content are required."));
        }
        match catalog.create(self.kind, &self.draft()) {
            Ok(item) => {
                tracing::debug!(kind = %self.kind, id = %item.id, "item created");
                on_created(item);
                self.open = false;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(kind = %self.kind, error = %e, "item creation failed");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MemoryCatalog;
    use crate::types::PromptType;

    #[test]
    fn blank_fields_block_submission_without_request() {
        let catalog = MemoryCatalog::new();
        let mut modal = CreationModal::new(ItemKind::Supplemental);
        modal.title = "Only a title".to_string();
        assert!(!modal.can_submit());

        let mut called = false;
        let err = modal.submit(&catalog, |_| called = true).unwrap_err();
        assert!(matches!(err, DeskError::UserInput(_)));
        assert!(!called);
        assert!(modal.is_open());
        assert!(catalog.snapshot().is_empty());
    }

    #[test]
    fn success_reports_item_and_closes() {
        let catalog = MemoryCatalog::new();
        let mut modal = CreationModal::new(ItemKind::Prompt(PromptType::Critique));
        modal.title = "  Tone ".to_string();
        modal.content = "Check the tone".to_string();
        modal.tags_input = "style, tone".to_string();

        let mut created = None;
        modal.submit(&catalog, |item| created = Some(item)).unwrap();

        let item = created.unwrap();
        assert_eq!(item.title, "Tone");
        assert_eq!(item.tags, vec!["style", "tone"]);
        assert_eq!(item.prompt_type, Some(PromptType::Critique));
        assert!(!modal.is_open());
    }

    #[test]
    fn backend_failure_keeps_values() {
        struct Rejecting;
        impl Catalog for Rejecting {
            fn fetch_all(&self, _: ItemKind) -> Result<Vec<Item>> {
                Ok(Vec::new())
            }
            fn create(&self, _: ItemKind, _: &ItemDraft) -> Result<Item> {
                Err(DeskError::Network("down".to_string()))
            }
        }

        let mut modal = CreationModal::new(ItemKind::Supplemental);
        modal.title = "Facts".to_string();
        modal.content = "Numbers".to_string();
        assert!(modal.submit(&Rejecting, |_| {}).is_err());
        assert!(modal.is_open());
        assert_eq!(modal.title, "Facts");
        assert_eq!(modal.content, "Numbers");
        assert!(modal.can_submit());
    }

    #[test]
    fn closed_modal_cannot_submit() {
        let mut modal = CreationModal::new(ItemKind::Supplemental);
        modal.title = "t".to_string();
        modal.content = "c".to_string();
        modal.close();
        assert!(modal.submit(&MemoryCatalog::new(), |_| {}).is_err());
    }
}
