use js_sys::Array;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Element, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit,
    ScrollBehavior, ScrollIntoViewOptions,
};

/// Страницы отчёта в порядке показа
pub const PAGE_IDS: [&str; 11] = [
    "capa",
    "resumo",
    "ativos",
    "passivos",
    "custos",
    "rentabilidade",
    "vendas",
    "tributario",
    "distribuicao",
    "conclusao",
    "agradecimentos",
];

/// A page counts as current once half of it is inside the scroll container
pub const VISIBILITY_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideKey {
    Next,
    Previous,
}

/// ArrowDown/ArrowRight листают вперёд, ArrowUp/ArrowLeft назад
pub fn slide_key(key: &str) -> Option<SlideKey> {
    match key {
        "ArrowDown" | "ArrowRight" => Some(SlideKey::Next),
        "ArrowUp" | "ArrowLeft" => Some(SlideKey::Previous),
        _ => None,
    }
}

pub fn nav_dot_id(page_id: &str) -> String {
    format!("nav-{}", page_id)
}

/// Current position in the slide deck
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SlideNavigator {
    current: usize,
}

impl SlideNavigator {
    pub fn current(&self) -> usize {
        self.current
    }

    pub fn current_id(&self) -> &'static str {
        PAGE_IDS[self.current]
    }

    /// Moves forward; `None` on the last page
    pub fn next(&mut self) -> Option<&'static str> {
        if self.current + 1 >= PAGE_IDS.len() {
            return None;
        }
        self.current += 1;
        Some(self.current_id())
    }

    /// Moves back; `None` on the first page
    pub fn previous(&mut self) -> Option<&'static str> {
        if self.current == 0 {
            return None;
        }
        self.current -= 1;
        Some(self.current_id())
    }

    pub fn step(&mut self, key: SlideKey) -> Option<&'static str> {
        match key {
            SlideKey::Next => self.next(),
            SlideKey::Previous => self.previous(),
        }
    }

    /// Scroll-spy update. Unknown ids are ignored.
    pub fn set_visible(&mut self, page_id: &str) -> bool {
        match PAGE_IDS.iter().position(|id| *id == page_id) {
            Some(index) => {
                self.current = index;
                true
            }
            None => false,
        }
    }
}

/// Плавная прокрутка к странице
pub fn scroll_to(page_id: &str) {
    let Some(element) = leptos::prelude::document().get_element_by_id(page_id) else {
        log::warn!("Slide '{}' not found", page_id);
        return;
    };
    let options = ScrollIntoViewOptions::new();
    options.set_behavior(ScrollBehavior::Smooth);
    element.scroll_into_view_with_scroll_into_view_options(&options);
}

/// Watches `pages` inside `root` and reports the id of each page that becomes
/// at least half visible. The observer lives as long as the page.
pub fn observe_pages(
    root: &Element,
    pages: &[Element],
    on_visible: impl Fn(String) + 'static,
) -> Result<(), JsValue> {
    let callback = Closure::wrap(Box::new(move |entries: Array, _observer: JsValue| {
        for entry in entries.iter() {
            let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                continue;
            };
            if entry.is_intersecting() {
                on_visible(entry.target().id());
            }
        }
    }) as Box<dyn FnMut(Array, JsValue)>);

    let init = IntersectionObserverInit::new();
    init.set_root(Some(root));
    init.set_threshold(&JsValue::from_f64(VISIBILITY_THRESHOLD));

    let observer =
        IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)?;
    for page in pages {
        observer.observe(page);
    }
    callback.forget();
    Ok(())
}
