use crate::checklist::{Persistable, NOTE_ENTRY_CLASS};
use crate::components::ui::{
    Alert, AlertDescription, Button, ButtonSize, ButtonVariant, Card, CardContent,
    CardDescription, CardFooter, CardHeader, CardTitle,
};
use crate::storage::{load_note_snapshot, save_note_snapshot};
use crate::util::{decode_note_id, format_saved_at};
use icons::Check;
use leptos::ev;
use leptos::html;
use leptos::prelude::*;
use leptos_router::params::Params;
use tw_merge::tw_merge;

const DEFAULT_NOTE_ID: &str = "scratch";

#[derive(Params, PartialEq, Clone, Debug)]
pub struct NoteRouteParams {
    pub note_id: Option<String>,
}

#[component]
fn SaveStatus(
    #[prop(into)] message: Signal<Option<String>>,
    #[prop(into, optional)] class: String,
) -> impl IntoView {
    let merged_class = tw_merge!("flex items-center gap-2 text-xs text-muted-foreground", class);

    view! {
        <Show when=move || message.get().is_some()>
            <Alert class=merged_class.clone()>
                <Check class="size-4" />
                <AlertDescription>{move || message.get().unwrap_or_default()}</AlertDescription>
            </Alert>
        </Show>
    }
}

#[component]
pub fn NotePage() -> impl IntoView {
    let params = leptos_router::hooks::use_params::<NoteRouteParams>();

    // Params are reactive; read tracked in effects/views, and read untracked in event handlers.
    let note_id = move || {
        params
            .get()
            .ok()
            .and_then(|p| p.note_id)
            .map(|raw| decode_note_id(&raw))
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| DEFAULT_NOTE_ID.to_string())
    };
    let note_id_untracked = move || {
        params
            .get_untracked()
            .ok()
            .and_then(|p| p.note_id)
            .map(|raw| decode_note_id(&raw))
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| DEFAULT_NOTE_ID.to_string())
    };

    let entry_ref: NodeRef<html::Div> = NodeRef::new();
    let status: RwSignal<Option<String>> = RwSignal::new(None);
    let dirty: RwSignal<bool> = RwSignal::new(false);

    // Load the snapshot whenever the route's note changes.
    Effect::new(move |_| {
        let id = note_id();
        let Some(entry) = entry_ref.get() else {
            return;
        };

        match load_note_snapshot(&id) {
            Some(snap) => {
                entry.set_inner_html(&snap.html);
                status.set(Some(format!("Loaded {} (saved {})", snap.note_id, format_saved_at(snap.saved_ms))));
            }
            None => {
                entry.set_inner_html("<p><br></p>");
                status.set(None);
            }
        }
        crate::default_session().after_load(&entry);
        dirty.set(false);
    });

    let on_save = move |_| {
        let Some(entry) = entry_ref.get_untracked() else {
            return;
        };
        crate::default_session().before_save(&entry);

        let snap = save_note_snapshot(&note_id_untracked(), entry.inner_html());
        status.set(Some(format!("Saved {} at {}", snap.note_id, format_saved_at(snap.saved_ms))));
        dirty.set(false);
    };

    // Keep focus (and the caret) inside the note while pressing the toolbar button.
    let keep_caret = move |ev: ev::MouseEvent| ev.prevent_default();

    let on_insert = move |_| {
        if crate::insert_checklist() {
            dirty.set(true);
        }
    };

    view! {
        <div class="mx-auto flex max-w-2xl flex-col gap-4 px-4 py-8">
            <Card>
                <CardHeader>
                    <CardTitle>{note_id}</CardTitle>
                    <CardDescription>
                        "Enter adds an item, Tab nests it, Ctrl+Enter toggles it."
                    </CardDescription>
                </CardHeader>
                <CardContent>
                    <div
                        node_ref=entry_ref
                        class=NOTE_ENTRY_CLASS
                        contenteditable="true"
                        on:input=move |_| dirty.set(true)
                    />
                </CardContent>
                <CardFooter class="justify-between">
                    <Button
                        variant=ButtonVariant::Outline
                        size=ButtonSize::Sm
                        on:mousedown=keep_caret
                        on:click=on_insert
                    >
                        <Check />
                        "Insert checklist"
                    </Button>
                    <Button size=ButtonSize::Sm on:click=on_save>
                        {move || if dirty.get() { "Save *" } else { "Save" }}
                    </Button>
                </CardFooter>
            </Card>
            <SaveStatus message=status />
        </div>
    }
}
