//! The five content types every site starts with.

use super::model::NewContentType;
use super::payload::{ABOUT_LAYOUT, MINDSET_LAYOUT, SKILLS_LAYOUT, SPORTS_LAYOUT, WORK_LAYOUT};
use super::schema::{
    AdminFormConfig, ContentTypeSchema, FieldDefinition as F, FieldKind as K, SchemaLayout,
};

fn definition(
    name: &str,
    slug: &str,
    icon: &str,
    layout_component: &str,
    fields: Vec<F>,
    sections: &[&str],
    admin_form_config: AdminFormConfig,
) -> NewContentType {
    NewContentType {
        slug: slug.to_string(),
        name: name.to_string(),
        icon: icon.to_string(),
        schema: ContentTypeSchema {
            fields,
            layout: SchemaLayout {
                sections: sections.iter().map(|s| s.to_string()).collect(),
                columns: Some(1),
            },
        },
        layout_component: layout_component.to_string(),
        admin_form_config,
        is_active: true,
    }
}

pub fn definitions() -> Vec<NewContentType> {
    vec![
        definition(
            "About Me",
            "about",
            "👤",
            ABOUT_LAYOUT,
            vec![
                F::new("title", K::Text, "Page Title").required().placeholder("About Me"),
                F::new("content", K::RichText, "Bio Content")
                    .required()
                    .placeholder("Write about yourself..."),
                F::new("profileImage", K::Image, "Profile Image"),
                F::new("skills", K::Array, "Key Skills").items(K::Text),
                F::new("location", K::Text, "Location").placeholder("City, Country"),
            ],
            &["basic", "content", "skills"],
            AdminFormConfig::default()
                .section("basic", "Basic Information", &["title", "location", "profileImage"])
                .section("content", "Content", &["content"])
                .section("skills", "Skills", &["skills"]),
        ),
        definition(
            "My Work",
            "work",
            "💼",
            WORK_LAYOUT,
            vec![
                F::new("title", K::Text, "Page Title").required().placeholder("My Work"),
                F::new("description", K::Textarea, "Page Description")
                    .placeholder("Brief description of your work..."),
                F::new("projects", K::Array, "Projects").items(K::Object),
            ],
            &["overview", "projects"],
            AdminFormConfig::default()
                .section("overview", "Overview", &["title", "description"])
                .section("projects", "Projects", &["projects"]),
        ),
        definition(
            "Skills",
            "skills",
            "🛠️",
            SKILLS_LAYOUT,
            vec![
                F::new("title", K::Text, "Page Title").required().placeholder("Skills"),
                F::new("description", K::Textarea, "Page Description")
                    .placeholder("Description of your skills..."),
                F::new("categories", K::Array, "Skill Categories").items(K::Object),
            ],
            &["overview", "categories"],
            AdminFormConfig::default()
                .section("overview", "Overview", &["title", "description"])
                .section("categories", "Skill Categories", &["categories"]),
        ),
        definition(
            "Mindset",
            "mindset",
            "🧠",
            MINDSET_LAYOUT,
            vec![
                F::new("title", K::Text, "Page Title").required().placeholder("Mindset"),
                F::new("content", K::RichText, "Main Content")
                    .required()
                    .placeholder("Share your thoughts and philosophy..."),
                F::new("featuredImage", K::Image, "Featured Image"),
                F::new("quotes", K::Array, "Inspirational Quotes").items(K::Object),
                F::new("categories", K::Array, "Categories").items(K::Text),
                F::new("philosophy", K::Textarea, "Personal Philosophy")
                    .placeholder("Your core beliefs and values..."),
            ],
            &["header", "content", "quotes", "philosophy"],
            AdminFormConfig::default()
                .section("header", "Header", &["title", "featuredImage", "categories"])
                .section("content", "Main Content", &["content"])
                .section("quotes", "Quotes", &["quotes"])
                .section("philosophy", "Philosophy", &["philosophy"]),
        ),
        definition(
            "Sports/Events",
            "sports",
            "🏃‍♂️",
            SPORTS_LAYOUT,
            vec![
                F::new("title", K::Text, "Page Title")
                    .required()
                    .placeholder("Sports & Events"),
                F::new("description", K::Textarea, "Page Description")
                    .placeholder("Description of your sports activities..."),
                F::new("events", K::Array, "Events/Activities").items(K::Object),
                F::new("achievements", K::Array, "Key Achievements").items(K::Object),
                F::new("currentSports", K::Array, "Current Sports").items(K::Text),
            ],
            &["overview", "current", "events", "achievements"],
            AdminFormConfig::default()
                .section("overview", "Overview", &["title", "description"])
                .section("current", "Current Sports", &["currentSports"])
                .section("events", "Events", &["events"])
                .section("achievements", "Achievements", &["achievements"]),
        ),
    ]
}
