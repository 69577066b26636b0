//! Dynamic content: types, items, visibility and rendering.

pub mod builtin;
pub mod items;
pub mod layout;
pub mod model;
pub mod payload;
pub mod registry;
pub mod schema;
pub mod slug;
pub mod visibility;

pub use items::ItemService;
pub use layout::{LayoutDispatcher, LayoutRenderer, RenderResult};
pub use model::{
    ContentItem, ContentItemPatch, ContentType, ContentTypeSummary, ContentTypeWithCount,
    CreateItem, ItemWrite, NewContentItem, NewContentType, RegisterContentType, ResolvedItem,
};
pub use payload::ContentPayload;
pub use registry::ContentTypeRegistry;
pub use schema::{AdminFormConfig, ContentTypeSchema, FieldDefinition, FieldKind, SchemaWarning};
pub use visibility::{FeedFilter, FeedGroup, FeedItem, PublicFeed, VisibilityResolver};
