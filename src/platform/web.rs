//! Browser collaborators
//!
//! WebSocket callbacks only queue what happened; the frame loop drains the
//! queue and feeds the [`Peer`](crate::net::Peer), so no callback ever holds
//! a borrow on game state.

use std::cell::RefCell;
use std::collections::{HashSet, VecDeque};
use std::rc::Rc;

use glam::Vec2;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::socket_needs_close;
use crate::input::{InputSource, normalize_key};
use crate::net::{Transport, TransportError};
use crate::renderer::Surface;
use crate::sim::Rect;

/// Something the socket reported since the last drain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketEvent {
    Open,
    Message(String),
    Closed(String),
}

type SocketQueue = Rc<RefCell<VecDeque<SocketEvent>>>;

pub struct WebSocketTransport {
    ws: web_sys::WebSocket,
    events: SocketQueue,
    // Keep closures alive for the lifetime of the socket.
    _onopen: Closure<dyn FnMut()>,
    _onmessage: Closure<dyn FnMut(web_sys::MessageEvent)>,
    _onerror: Closure<dyn FnMut(web_sys::Event)>,
    _onclose: Closure<dyn FnMut(web_sys::CloseEvent)>,
}

impl WebSocketTransport {
    /// Start dialing `url`. The open/close outcome arrives through
    /// [`drain`](Self::drain).
    pub fn connect(url: &str) -> Result<Self, JsValue> {
        let events: SocketQueue = Rc::new(RefCell::new(VecDeque::new()));

        let ws = web_sys::WebSocket::new(url)?;
        ws.set_binary_type(web_sys::BinaryType::Arraybuffer);

        let queue = events.clone();
        let onopen = Closure::<dyn FnMut()>::new(move || {
            log::info!("WebSocket open");
            queue.borrow_mut().push_back(SocketEvent::Open);
        });
        ws.set_onopen(Some(onopen.as_ref().unchecked_ref()));

        let queue = events.clone();
        let onmessage =
            Closure::<dyn FnMut(web_sys::MessageEvent)>::new(move |ev: web_sys::MessageEvent| {
                match ev.data().as_string() {
                    Some(text) => queue.borrow_mut().push_back(SocketEvent::Message(text)),
                    None => log::warn!("Ignoring non-text frame"),
                }
            });
        ws.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));

        let onerror = Closure::<dyn FnMut(web_sys::Event)>::new(move |_ev: web_sys::Event| {
            log::error!("WebSocket error");
        });
        ws.set_onerror(Some(onerror.as_ref().unchecked_ref()));

        let queue = events.clone();
        let onclose =
            Closure::<dyn FnMut(web_sys::CloseEvent)>::new(move |ev: web_sys::CloseEvent| {
                log::info!("WebSocket closed: {}", ev.reason());
                queue.borrow_mut().push_back(SocketEvent::Closed(ev.reason()));
            });
        ws.set_onclose(Some(onclose.as_ref().unchecked_ref()));

        Ok(Self {
            ws,
            events,
            _onopen: onopen,
            _onmessage: onmessage,
            _onerror: onerror,
            _onclose: onclose,
        })
    }

    /// Everything reported since the last call, oldest first
    pub fn drain(&self) -> Vec<SocketEvent> {
        self.events.borrow_mut().drain(..).collect()
    }
}

impl Transport for WebSocketTransport {
    fn send_text(&mut self, text: &str) -> Result<(), TransportError> {
        self.ws
            .send_with_str(text)
            .map_err(|e| TransportError::Send(format!("{:?}", e)))
    }

    fn close(&mut self) {
        if socket_needs_close(self.ws.ready_state()) {
            let _ = self.ws.close();
        }
    }
}

impl Drop for WebSocketTransport {
    fn drop(&mut self) {
        self.ws.set_onopen(None);
        self.ws.set_onmessage(None);
        self.ws.set_onerror(None);
        self.ws.set_onclose(None);
        self.close();
    }
}

/// Canvas 2D context as a [`Surface`]
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("canvas has no 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Self { canvas, ctx })
    }

    /// Look a canvas up by element id
    pub fn by_id(document: &web_sys::Document, id: &str) -> Result<Self, JsValue> {
        let canvas = document
            .get_element_by_id(id)
            .ok_or_else(|| JsValue::from_str(&format!("no element #{id}")))?
            .dyn_into::<HtmlCanvasElement>()?;
        Self::new(canvas)
    }
}

impl Surface for CanvasSurface {
    fn clear(&mut self) {
        let (w, h) = (self.canvas.width() as f64, self.canvas.height() as f64);
        self.ctx.clear_rect(0.0, 0.0, w, h);
    }

    fn fill_rect(&mut self, rect: Rect, color: &str) {
        self.ctx.set_fill_style_str(color);
        self.ctx.fill_rect(
            rect.x as f64,
            rect.y as f64,
            rect.width as f64,
            rect.height as f64,
        );
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: &str) {
        self.ctx.set_fill_style_str(color);
        self.ctx.begin_path();
        let _ = self.ctx.arc(
            center.x as f64,
            center.y as f64,
            radius as f64,
            0.0,
            std::f64::consts::TAU,
        );
        self.ctx.fill();
    }

    fn fill_text(&mut self, text: &str, pos: Vec2, font: &str, color: &str) {
        self.ctx.set_fill_style_str(color);
        self.ctx.set_font(font);
        let _ = self.ctx.fill_text(text, pos.x as f64, pos.y as f64);
    }
}

/// Held keys, fed by `keydown`/`keyup` listeners
#[derive(Debug, Clone, Default)]
pub struct KeyboardState(Rc<RefCell<HashSet<String>>>);

impl KeyboardState {
    pub fn press(&self, key: &str) {
        self.0.borrow_mut().insert(normalize_key(key));
    }

    pub fn release(&self, key: &str) {
        self.0.borrow_mut().remove(&normalize_key(key));
    }

    /// Forget everything, e.g. when the window loses focus mid-press
    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

impl InputSource for KeyboardState {
    fn is_pressed(&self, key: &str) -> bool {
        self.0.borrow().contains(key)
    }
}
