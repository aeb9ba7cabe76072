use gloo_net::http::Request;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use wasm_bindgen_futures::spawn_local;
use web_sys::{
    window, Document, Element, Event, EventTarget, HtmlButtonElement, HtmlElement,
    HtmlFormElement, HtmlImageElement, HtmlInputElement, HtmlTextAreaElement, HtmlVideoElement,
    IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit, KeyboardEvent,
    MouseEvent, Node,
};

use ana_portfolio::interactions::{self, FilterAction};

const REVEAL_THRESHOLD: f64 = 0.12;
const SKILL_THRESHOLD: f64 = 0.35;
const SCROLLSPY_THRESHOLD: f64 = 0.45;
const SECTION_IDS: [&str; 6] = ["hero", "about", "skills", "portfolio", "services", "contact"];
const FILTER_HIDE_DELAY_MS: i32 = 300;
const RIPPLE_DURATION_MS: f64 = 600.0;
const RIPPLE_CLEANUP_MS: i32 = 650;
const RIPPLE_EASING: &str = "cubic-bezier(.2,.8,.2,1)";
const CONTACT_ENDPOINT: &str = "/api/contact";
const SENDING_LABEL: &str = "Mengirim...";
const SUBMIT_LABEL_HTML: &str = "<span class=\"btn-label\">Kirim Pesan</span>";
const VALIDATION_MESSAGE: &str = "Harap isi semua kolom.";
const SUCCESS_MESSAGE: &str = "Pesan berhasil dikirim.";
const FALLBACK_MESSAGE_HTML: &str =
    "Form demo tidak aktif. Kirim email ke <a href=\"mailto:ana@example.com\">ana@example.com</a>";
const STATUS_ERROR_COLOR: &str = "var(--accent-2)";

pub fn run() {
    let Some(document) = window().and_then(|w| w.document()) else {
        return;
    };

    stamp_footer_year(&document);
    init_mobile_nav(&document);
    init_reveal(&document);
    init_skill_bars(&document);
    init_portfolio_filter(&document);
    init_lightbox(&document);
    init_ripples(&document);
    init_profile_parallax(&document);
    init_tilt(&document);
    init_contact_form(&document);
    init_focus_ring(&document);
    init_scrollspy(&document);
}

fn query_all(document: &Document, selector: &str) -> Vec<Element> {
    let Ok(list) = document.query_selector_all(selector) else {
        return Vec::new();
    };

    (0..list.length())
        .filter_map(|index| list.item(index))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

fn intersection_observer(
    callback: &Closure<dyn FnMut(js_sys::Array, IntersectionObserver)>,
    threshold: f64,
) -> Option<IntersectionObserver> {
    let options = IntersectionObserverInit::new();
    options.set_threshold(&JsValue::from_f64(threshold));
    IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options).ok()
}

fn stamp_footer_year(document: &Document) {
    if let Some(year) = document.get_element_by_id("year") {
        year.set_text_content(Some(&js_sys::Date::new_0().get_full_year().to_string()));
    }
}

fn init_mobile_nav(document: &Document) {
    let Some(nav_list) = document.get_element_by_id("nav-list") else {
        return;
    };
    let toggle = document.query_selector(".nav-toggle").ok().flatten();

    if let Some(toggle) = toggle.clone() {
        let nav_list = nav_list.clone();
        let toggle_handle = toggle.clone();
        let handler = Closure::<dyn FnMut()>::new(move || {
            let expanded = toggle_handle.get_attribute("aria-expanded").as_deref() == Some("true");
            let _ =
                toggle_handle.set_attribute("aria-expanded", if expanded { "false" } else { "true" });
            let _ = nav_list.class_list().toggle("show");
        });
        let _ = toggle.add_event_listener_with_callback("click", handler.as_ref().unchecked_ref());
        handler.forget();
    }

    for link in query_all(document, ".nav-list a") {
        let nav_list = nav_list.clone();
        let toggle = toggle.clone();
        let handler = Closure::<dyn FnMut()>::new(move || {
            let _ = nav_list.class_list().remove_1("show");
            if let Some(toggle) = toggle.as_ref() {
                let _ = toggle.set_attribute("aria-expanded", "false");
            }
        });
        let _ = link.add_event_listener_with_callback("click", handler.as_ref().unchecked_ref());
        handler.forget();
    }
}

fn reveal_index(document: &Document, node: &Element) -> usize {
    let group = match node.closest(".container").ok().flatten() {
        Some(container) => container.query_selector_all("[data-reveal]").ok(),
        None => document.query_selector_all("[data-reveal]").ok(),
    };
    let Some(group) = group else {
        return 0;
    };

    let target: Node = node.clone().into();
    for index in 0..group.length() {
        if group.item(index).is_some_and(|candidate| candidate == target) {
            return index as usize;
        }
    }

    0
}

fn init_reveal(document: &Document) {
    let nodes = query_all(document, "[data-reveal]");
    if nodes.is_empty() {
        return;
    }

    let doc = document.clone();
    let callback = Closure::<dyn FnMut(js_sys::Array, IntersectionObserver)>::new(
        move |entries: js_sys::Array, observer: IntersectionObserver| {
            for entry in entries.iter() {
                let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                    continue;
                };
                if !entry.is_intersecting() {
                    continue;
                }

                // index is measured at entry time, so siblings inserted later
                // still land in a consistent cascade
                let node = entry.target();
                let delay = interactions::stagger_delay_seconds(reveal_index(&doc, &node));
                if let Some(styled) = node.dyn_ref::<HtmlElement>() {
                    let _ = styled
                        .style()
                        .set_property("transition-delay", &format!("{delay:.2}s"));
                }
                let _ = node.class_list().add_1("visible");
                observer.unobserve(&node);
            }
        },
    );

    let Some(observer) = intersection_observer(&callback, REVEAL_THRESHOLD) else {
        return;
    };
    callback.forget();

    for node in &nodes {
        observer.observe(node);
    }
}

fn init_skill_bars(document: &Document) {
    for bar in query_all(document, ".skill-bar") {
        let level = interactions::parse_skill_level(bar.get_attribute("data-level").as_deref());
        let Some(fill) = bar
            .query_selector(".fill")
            .ok()
            .flatten()
            .and_then(|element| element.dyn_into::<HtmlElement>().ok())
        else {
            continue;
        };

        let callback = Closure::<dyn FnMut(js_sys::Array, IntersectionObserver)>::new(
            move |entries: js_sys::Array, observer: IntersectionObserver| {
                for entry in entries.iter() {
                    let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                        continue;
                    };
                    if !entry.is_intersecting() {
                        continue;
                    }

                    let _ = fill.style().set_property("width", &format!("{level}%"));
                    observer.unobserve(&entry.target());
                }
            },
        );

        let Some(observer) = intersection_observer(&callback, SKILL_THRESHOLD) else {
            continue;
        };
        callback.forget();
        observer.observe(&bar);
    }
}

fn init_portfolio_filter(document: &Document) {
    let buttons = query_all(document, ".filter-btn");
    let items: Rc<Vec<HtmlElement>> = Rc::new(
        query_all(document, ".portfolio-item")
            .into_iter()
            .filter_map(|element| element.dyn_into::<HtmlElement>().ok())
            .collect(),
    );
    if buttons.is_empty() || items.is_empty() {
        return;
    }

    let hide_timers: Rc<RefCell<Vec<Option<i32>>>> = Rc::new(RefCell::new(vec![None; items.len()]));

    for button in &buttons {
        let clicked = button.clone();
        let all_buttons = buttons.clone();
        let items = Rc::clone(&items);
        let hide_timers = Rc::clone(&hide_timers);
        let handler = Closure::<dyn FnMut()>::new(move || {
            for other in &all_buttons {
                let _ = other.class_list().remove_1("active");
            }
            let _ = clicked.class_list().add_1("active");

            let selected = clicked
                .get_attribute("data-filter")
                .unwrap_or_else(|| interactions::FILTER_WILDCARD.to_string());
            apply_filter(&selected, &items, &hide_timers);
        });
        let _ = button.add_event_listener_with_callback("click", handler.as_ref().unchecked_ref());
        handler.forget();
    }
}

fn apply_filter(selected: &str, items: &[HtmlElement], hide_timers: &Rc<RefCell<Vec<Option<i32>>>>) {
    let Some(window) = window() else {
        return;
    };

    for (index, item) in items.iter().enumerate() {
        // cancel the item's pending hide so a re-show never loses to a stale timer
        if let Some(handle) = hide_timers.borrow_mut()[index].take() {
            window.clear_timeout_with_handle(handle);
        }

        match interactions::filter_action(selected, item.get_attribute("data-category").as_deref()) {
            FilterAction::Show => {
                let _ = item.style().remove_property("display");
                let item = item.clone();
                // hidden-marker clears a frame later so the transition sees the display change
                let reveal = Closure::once_into_js(move || {
                    let _ = item.class_list().remove_1("hidden");
                });
                let _ = window.request_animation_frame(reveal.unchecked_ref());
            }
            FilterAction::Hide => {
                let _ = item.class_list().add_1("hidden");
                let item = item.clone();
                let conceal = Closure::once_into_js(move || {
                    let _ = item.style().set_property("display", "none");
                });
                if let Ok(handle) = window.set_timeout_with_callback_and_timeout_and_arguments_0(
                    conceal.unchecked_ref(),
                    FILTER_HIDE_DELAY_MS,
                ) {
                    hide_timers.borrow_mut()[index] = Some(handle);
                }
            }
        }
    }
}

fn init_lightbox(document: &Document) {
    let Some(lightbox) = document.get_element_by_id("lightbox") else {
        return;
    };
    let Some(content) = lightbox.query_selector(".lb-content").ok().flatten() else {
        return;
    };

    for trigger in query_all(document, ".media-btn") {
        let document = document.clone();
        let lightbox = lightbox.clone();
        let content = content.clone();
        let source = trigger.clone();
        let handler = Closure::<dyn FnMut()>::new(move || {
            let Some(src) = source.get_attribute("data-src") else {
                return;
            };
            let kind = source
                .get_attribute("data-type")
                .unwrap_or_else(|| "image".to_string());
            let alt = source.get_attribute("aria-label").unwrap_or_default();
            open_lightbox(&document, &lightbox, &content, &kind, &src, &alt);
        });
        let _ = trigger.add_event_listener_with_callback("click", handler.as_ref().unchecked_ref());
        handler.forget();
    }

    if let Some(close_control) = document.query_selector(".lb-close").ok().flatten() {
        let document = document.clone();
        let lightbox = lightbox.clone();
        let content = content.clone();
        let handler =
            Closure::<dyn FnMut()>::new(move || close_lightbox(&document, &lightbox, &content));
        let _ = close_control
            .add_event_listener_with_callback("click", handler.as_ref().unchecked_ref());
        handler.forget();
    }

    {
        let doc = document.clone();
        let overlay: EventTarget = lightbox.clone().into();
        let lightbox_handle = lightbox.clone();
        let content = content.clone();
        let handler = Closure::<dyn FnMut(MouseEvent)>::new(move |event: MouseEvent| {
            if event.target().as_ref() == Some(&overlay) {
                close_lightbox(&doc, &lightbox_handle, &content);
            }
        });
        let _ = lightbox.add_event_listener_with_callback("click", handler.as_ref().unchecked_ref());
        handler.forget();
    }

    {
        let doc = document.clone();
        let lightbox = lightbox.clone();
        let content = content.clone();
        let handler = Closure::<dyn FnMut(KeyboardEvent)>::new(move |event: KeyboardEvent| {
            if event.key() == "Escape" && lightbox.class_list().contains("show") {
                close_lightbox(&doc, &lightbox, &content);
            }
        });
        let _ =
            document.add_event_listener_with_callback("keydown", handler.as_ref().unchecked_ref());
        handler.forget();
    }
}

fn open_lightbox(
    document: &Document,
    lightbox: &Element,
    content: &Element,
    kind: &str,
    src: &str,
    alt: &str,
) {
    // replaces any previous media, so reopening never stacks content
    content.set_inner_html("");

    if kind == "video" {
        if let Some(video) = document
            .create_element("video")
            .ok()
            .and_then(|element| element.dyn_into::<HtmlVideoElement>().ok())
        {
            video.set_src(src);
            video.set_controls(true);
            video.set_autoplay(true);
            let _ = video.style().set_property("width", "100%");
            let _ = content.append_child(&video);
        }
    } else if let Some(image) = document
        .create_element("img")
        .ok()
        .and_then(|element| element.dyn_into::<HtmlImageElement>().ok())
    {
        image.set_src(src);
        image.set_alt(alt);
        let _ = image.style().set_property("width", "100%");
        let _ = image.style().set_property("height", "auto");
        let _ = image.style().set_property("border-radius", "12px");
        let _ = content.append_child(&image);
    }

    let _ = lightbox.class_list().add_1("show");
    let _ = lightbox.set_attribute("aria-hidden", "false");
    if let Some(body) = document.body() {
        let _ = body.style().set_property("overflow", "hidden");
    }
}

fn close_lightbox(document: &Document, lightbox: &Element, content: &Element) {
    let _ = lightbox.class_list().remove_1("show");
    let _ = lightbox.set_attribute("aria-hidden", "true");
    // clearing content stops an off-screen video from playing on
    content.set_inner_html("");
    if let Some(body) = document.body() {
        let _ = body.style().remove_property("overflow");
    }
}

fn ripple_frames() -> Option<js_sys::Array> {
    let start = js_sys::Object::new();
    js_sys::Reflect::set(&start, &"transform".into(), &"scale(0)".into()).ok()?;
    js_sys::Reflect::set(&start, &"opacity".into(), &JsValue::from_f64(0.6)).ok()?;
    js_sys::Reflect::set(&start, &"easing".into(), &RIPPLE_EASING.into()).ok()?;

    let end = js_sys::Object::new();
    js_sys::Reflect::set(&end, &"transform".into(), &"scale(1)".into()).ok()?;
    js_sys::Reflect::set(&end, &"opacity".into(), &JsValue::from_f64(0.0)).ok()?;

    Some(js_sys::Array::of2(&start, &end))
}

fn init_ripples(document: &Document) {
    for button in query_all(document, ".btn") {
        let document = document.clone();
        let target = button.clone();
        let handler = Closure::<dyn FnMut(MouseEvent)>::new(move |event: MouseEvent| {
            spawn_ripple(&document, &target, &event);
        });
        let _ = button.add_event_listener_with_callback("click", handler.as_ref().unchecked_ref());
        handler.forget();
    }
}

fn spawn_ripple(document: &Document, button: &Element, event: &MouseEvent) {
    let Some(window) = window() else {
        return;
    };
    let Some(ripple) = document
        .create_element("span")
        .ok()
        .and_then(|element| element.dyn_into::<HtmlElement>().ok())
    else {
        return;
    };

    ripple.set_class_name("ripple");
    let rect = button.get_bounding_client_rect();
    let geometry = interactions::ripple_geometry(
        rect.width(),
        rect.height(),
        event.client_x() as f64,
        event.client_y() as f64,
        rect.left(),
        rect.top(),
    );

    let style = ripple.style();
    let _ = style.set_property("width", &format!("{:.2}px", geometry.diameter));
    let _ = style.set_property("height", &format!("{:.2}px", geometry.diameter));
    let _ = style.set_property("left", &format!("{:.2}px", geometry.left));
    let _ = style.set_property("top", &format!("{:.2}px", geometry.top));
    let _ = button.append_child(&ripple);

    if let Some(frames) = ripple_frames() {
        let _ = ripple.animate_with_f64(Some(frames.unchecked_ref()), RIPPLE_DURATION_MS);
    }

    let cleanup = Closure::once_into_js(move || ripple.remove());
    let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
        cleanup.unchecked_ref(),
        RIPPLE_CLEANUP_MS,
    );
}

fn init_profile_parallax(document: &Document) {
    let Some(profile) = document
        .get_element_by_id("profileParallax")
        .and_then(|element| element.dyn_into::<HtmlElement>().ok())
    else {
        return;
    };

    {
        let profile_handle = profile.clone();
        let handler = Closure::<dyn FnMut(MouseEvent)>::new(move |event: MouseEvent| {
            let rect = profile_handle.get_bounding_client_rect();
            let (px, py) = interactions::pointer_offsets(
                event.client_x() as f64,
                event.client_y() as f64,
                rect.left(),
                rect.top(),
                rect.width(),
                rect.height(),
            );
            let _ = profile_handle
                .style()
                .set_property("transform", &interactions::parallax_transform(px, py));
        });
        let _ =
            profile.add_event_listener_with_callback("mousemove", handler.as_ref().unchecked_ref());
        handler.forget();
    }

    {
        let profile_handle = profile.clone();
        let handler = Closure::<dyn FnMut()>::new(move || {
            let _ = profile_handle.style().remove_property("transform");
        });
        let _ =
            profile.add_event_listener_with_callback("mouseleave", handler.as_ref().unchecked_ref());
        handler.forget();
    }
}

fn init_tilt(document: &Document) {
    for item in query_all(document, ".portfolio-item") {
        let Ok(item) = item.dyn_into::<HtmlElement>() else {
            continue;
        };

        {
            let item_handle = item.clone();
            let handler = Closure::<dyn FnMut(MouseEvent)>::new(move |event: MouseEvent| {
                let rect = item_handle.get_bounding_client_rect();
                let (x, y) = interactions::pointer_offsets(
                    event.client_x() as f64,
                    event.client_y() as f64,
                    rect.left(),
                    rect.top(),
                    rect.width(),
                    rect.height(),
                );
                let _ = item_handle
                    .style()
                    .set_property("transform", &interactions::tilt_transform(x, y));
                if let Some(image) = tilt_image(&item_handle) {
                    let _ = image
                        .style()
                        .set_property("transform", &interactions::tilt_image_transform(x));
                }
            });
            let _ =
                item.add_event_listener_with_callback("mousemove", handler.as_ref().unchecked_ref());
            handler.forget();
        }

        {
            let item_handle = item.clone();
            let handler = Closure::<dyn FnMut()>::new(move || {
                let _ = item_handle.style().remove_property("transform");
                if let Some(image) = tilt_image(&item_handle) {
                    let _ = image.style().remove_property("transform");
                }
            });
            let _ = item
                .add_event_listener_with_callback("mouseleave", handler.as_ref().unchecked_ref());
            handler.forget();
        }
    }
}

fn tilt_image(item: &HtmlElement) -> Option<HtmlElement> {
    item.query_selector("img")
        .ok()
        .flatten()
        .and_then(|element| element.dyn_into::<HtmlElement>().ok())
}

fn field_value(form: &HtmlFormElement, selector: &str) -> String {
    let Some(element) = form.query_selector(selector).ok().flatten() else {
        return String::new();
    };

    if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
        return input.value();
    }
    if let Some(area) = element.dyn_ref::<HtmlTextAreaElement>() {
        return area.value();
    }

    String::new()
}

fn restore_submit(button: &HtmlButtonElement) {
    button.set_disabled(false);
    button.set_inner_html(SUBMIT_LABEL_HTML);
}

async fn send_contact(payload: &interactions::ContactPayload) -> Result<(), ()> {
    let request = Request::post(CONTACT_ENDPOINT).json(payload).map_err(|_| ())?;
    let response = request.send().await.map_err(|_| ())?;

    if response.ok() {
        Ok(())
    } else {
        Err(())
    }
}

fn init_contact_form(document: &Document) {
    let Some(form) = document
        .get_element_by_id("contactForm")
        .and_then(|element| element.dyn_into::<HtmlFormElement>().ok())
    else {
        return;
    };
    let status = document
        .get_element_by_id("formMsg")
        .and_then(|element| element.dyn_into::<HtmlElement>().ok());

    let form_handle = form.clone();
    let handler = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
        event.prevent_default();

        let Some(button) = form_handle
            .query_selector("button[type='submit']")
            .ok()
            .flatten()
            .and_then(|element| element.dyn_into::<HtmlButtonElement>().ok())
        else {
            return;
        };

        if let Some(slot) = status.as_ref() {
            slot.set_text_content(Some(""));
            let _ = slot.style().remove_property("color");
        }
        button.set_disabled(true);
        button.set_inner_html(SENDING_LABEL);

        let name = field_value(&form_handle, "input[name='name']");
        let email = field_value(&form_handle, "input[name='email']");
        let message = field_value(&form_handle, "textarea[name='message']");

        let Some(payload) = interactions::normalized_contact(&name, &email, &message) else {
            if let Some(slot) = status.as_ref() {
                slot.set_text_content(Some(VALIDATION_MESSAGE));
            }
            restore_submit(&button);
            return;
        };

        let form = form_handle.clone();
        let status = status.clone();
        spawn_local(async move {
            match send_contact(&payload).await {
                Ok(()) => {
                    if let Some(slot) = status.as_ref() {
                        let _ = slot.style().remove_property("color");
                        slot.set_text_content(Some(SUCCESS_MESSAGE));
                    }
                    form.reset();
                }
                Err(()) => {
                    if let Some(slot) = status.as_ref() {
                        let _ = slot.style().set_property("color", STATUS_ERROR_COLOR);
                        slot.set_inner_html(FALLBACK_MESSAGE_HTML);
                    }
                }
            }

            // runs on every path, success or not
            restore_submit(&button);
        });
    });
    let _ = form.add_event_listener_with_callback("submit", handler.as_ref().unchecked_ref());
    handler.forget();
}

fn init_focus_ring(document: &Document) {
    let Some(root) = document.document_element() else {
        return;
    };

    let handler = Closure::<dyn FnMut(KeyboardEvent)>::new(move |event: KeyboardEvent| {
        if event.key() == "Tab" && !root.class_list().contains("user-is-tabbing") {
            let _ = root.class_list().add_1("user-is-tabbing");
        }
    });
    let _ = document.add_event_listener_with_callback("keydown", handler.as_ref().unchecked_ref());
    handler.forget();
}

fn init_scrollspy(document: &Document) {
    let doc = document.clone();
    let callback = Closure::<dyn FnMut(js_sys::Array, IntersectionObserver)>::new(
        move |entries: js_sys::Array, _observer: IntersectionObserver| {
            for entry in entries.iter() {
                let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                    continue;
                };
                if !entry.is_intersecting() {
                    continue;
                }

                let id = entry.target().id();
                for link in query_all(&doc, ".nav-link") {
                    let _ = link.class_list().remove_1("active");
                }
                if let Some(link) = doc
                    .query_selector(&interactions::nav_link_selector(&id))
                    .ok()
                    .flatten()
                {
                    let _ = link.class_list().add_1("active");
                }
            }
        },
    );

    let Some(observer) = intersection_observer(&callback, SCROLLSPY_THRESHOLD) else {
        return;
    };
    callback.forget();

    // sections stay observed so the highlight follows scrolling both ways
    for id in SECTION_IDS {
        if let Some(section) = document.get_element_by_id(id) {
            observer.observe(&section);
        }
    }
}
