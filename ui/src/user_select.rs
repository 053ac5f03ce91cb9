use dioxus::prelude::*;
use sync::User;

/// Select control over the known users, reporting the chosen primary key.
#[component]
pub fn UserSelect(
    users: Vec<User>,
    selected: Option<String>,
    on_select: EventHandler<String>,
) -> Element {
    rsx! {
        select {
            class: "form-control",
            value: selected.clone().unwrap_or_default(),
            onchange: move |evt| on_select.call(evt.value()),
            for user in &users {
                option {
                    key: "{user.primary_key}",
                    value: "{user.primary_key}",
                    "{user.username}"
                }
            }
        }
    }
}
