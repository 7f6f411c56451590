//! Twin Breakout entry point
//!
//! On the web: wires the canvases, keyboard, and relay socket into a
//! [`Peer`](twin_breakout::Peer) and runs the frame loop. Natively: plays a
//! headless match between two bots over loopback and logs how it went.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;

    use twin_breakout::input;
    use twin_breakout::net::PhaseChange;
    use twin_breakout::platform::web::{
        CanvasSurface, KeyboardState, SocketEvent, WebSocketTransport,
    };
    use twin_breakout::renderer::{draw_local, draw_mirror};
    use twin_breakout::{Peer, Settings};

    /// Everything the frame loop touches
    struct App {
        peer: Peer<WebSocketTransport>,
        local: CanvasSurface,
        opponent: CanvasSurface,
        keys: KeyboardState,
        settings: Settings,
        redial_pending: bool,
    }

    thread_local! {
        static APP: RefCell<Option<Rc<RefCell<App>>>> = const { RefCell::new(None) };
    }

    fn with_app<R>(f: impl FnOnce(&mut App) -> R) -> Option<R> {
        let app = APP.with(|slot| slot.borrow().clone())?;
        let mut app = app.borrow_mut();
        Some(f(&mut app))
    }

    /// Lives left on the local board
    #[wasm_bindgen(js_name = getLives)]
    pub fn get_lives() -> u32 {
        with_app(|app| app.peer.lives()).unwrap_or(0)
    }

    /// Restart both boards without reconnecting
    #[wasm_bindgen(js_name = resetGame)]
    pub fn reset_game() {
        with_app(|app| app.peer.reset_game());
    }

    /// Drop the relay connection
    #[wasm_bindgen(js_name = disconnect)]
    pub fn disconnect() {
        with_app(|app| app.peer.disconnect());
    }

    impl App {
        /// Feed socket callbacks queued since the last frame into the peer
        fn pump_socket(&mut self) -> bool {
            let mut closed = false;
            for event in self.peer.channel().transport().drain() {
                match event {
                    SocketEvent::Open => self.peer.handle_open(),
                    SocketEvent::Message(text) => self.peer.handle_message(&text),
                    SocketEvent::Closed(_) => {
                        self.peer.handle_close();
                        closed = true;
                    }
                }
            }
            closed
        }

        fn frame(&mut self) {
            let closed = self.pump_socket();
            self.peer.tick(&input::poll(&self.keys));

            let session = self.peer.session();
            draw_local(&mut self.local, session);
            if self.settings.show_opponent {
                draw_mirror(&mut self.opponent, session);
            }

            if closed && !self.redial_pending {
                if let Some(delay) = self.settings.reconnect_delay() {
                    self.redial_pending = true;
                    schedule_redial(delay);
                }
            }
        }

        fn redial(&mut self) {
            self.redial_pending = false;
            match WebSocketTransport::connect(&self.settings.server_url) {
                Ok(transport) => self.peer.reconnect(transport),
                Err(e) => log::error!("Redial failed: {:?}", e),
            }
        }
    }

    fn schedule_redial(delay_ms: i32) {
        log::info!("Redialing in {}ms", delay_ms);
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move || {
            with_app(App::redial);
        });
        let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            delay_ms,
        );
        closure.forget();
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Twin Breakout starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let local = CanvasSurface::by_id(&document, "localCanvas").expect("no local canvas");
        let opponent =
            CanvasSurface::by_id(&document, "opponentCanvas").expect("no opponent canvas");

        let settings = Settings::load();
        let transport = match WebSocketTransport::connect(&settings.server_url) {
            Ok(transport) => transport,
            Err(e) => {
                log::error!("Could not open {}: {:?}", settings.server_url, e);
                return;
            }
        };

        let mut peer = Peer::new(transport);
        peer.session_mut().subscribe(toggle_restart_button);
        peer.connect();

        let keys = KeyboardState::default();
        setup_input_handlers(&keys);
        setup_restart_button();

        let app = Rc::new(RefCell::new(App {
            peer,
            local,
            opponent,
            keys,
            settings,
            redial_pending: false,
        }));
        APP.with(|slot| *slot.borrow_mut() = Some(app.clone()));

        // Start game loop
        request_animation_frame(app);

        log::info!("Twin Breakout running!");
    }

    /// Show the restart button only once the local round is decided
    fn toggle_restart_button(change: PhaseChange) {
        let PhaseChange::Local(phase) = change else {
            return;
        };
        let document = web_sys::window().and_then(|w| w.document());
        if let Some(btn) = document.and_then(|d| d.get_element_by_id("restartBtn")) {
            let display = if phase.is_terminal() { "block" } else { "none" };
            let _ = btn.set_attribute("style", &format!("display: {display}"));
        }
    }

    fn setup_input_handlers(keys: &KeyboardState) {
        let window = web_sys::window().unwrap();

        {
            let keys = keys.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                keys.press(&event.key());
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let keys = keys.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                keys.release(&event.key());
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keys released while unfocused never send keyup
        {
            let keys = keys.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                keys.clear();
            });
            let _ =
                window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_restart_button() {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();

        if let Some(btn) = document.get_element_by_id("restartBtn") {
            let _ = btn.set_attribute("style", "display: none");
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                log::info!("Restart requested, reloading");
                if let Some(window) = web_sys::window() {
                    let _ = window.location().reload();
                }
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |_time: f64| {
            game_loop(app);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(app: Rc<RefCell<App>>) {
        app.borrow_mut().frame();
        request_animation_frame(app);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    headless::run();
}

/// Two bots over loopback, routed through the same lobby the relay uses
#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use twin_breakout::net::{LoopbackTransport, Wire};
    use twin_breakout::relay::{Delivery, Lobby, PlayerId};
    use twin_breakout::sim::{Phase, TickInput};
    use twin_breakout::{LocalGame, Peer};

    const MAX_FRAMES: u32 = 20_000;

    struct Seat {
        id: PlayerId,
        peer: Peer<LoopbackTransport>,
        wire: Wire,
        /// Bots that track the ball; the other one never moves
        tracks_ball: bool,
    }

    impl Seat {
        fn new(id: PlayerId, tracks_ball: bool) -> Self {
            let (transport, wire) = LoopbackTransport::new();
            Self {
                id,
                peer: Peer::new(transport),
                wire,
                tracks_ball,
            }
        }

        fn input(&self) -> TickInput {
            if !self.tracks_ball {
                return TickInput::default();
            }
            autopilot(self.peer.session().local())
        }
    }

    /// Steer the paddle under the ball
    fn autopilot(game: &LocalGame) -> TickInput {
        let board = game.board();
        let offset = board.ball.center().x - board.paddle.center_x();
        TickInput {
            left: offset < -board.paddle.width / 4.0,
            right: offset > board.paddle.width / 4.0,
        }
    }

    fn deliver(seats: &mut [Seat], deliveries: Vec<Delivery>) {
        for delivery in deliveries {
            if let Some(seat) = seats.iter_mut().find(|s| s.id == delivery.to) {
                seat.peer.handle_message(&delivery.text);
            }
        }
    }

    /// Move every frame sent so far through the lobby
    fn route(lobby: &Lobby, seats: &mut [Seat]) {
        let mut deliveries = Vec::new();
        for seat in seats.iter() {
            for text in seat.wire.drain() {
                deliveries.extend(lobby.route(seat.id, &text));
            }
        }
        deliver(seats, deliveries);
    }

    pub fn run() {
        log::info!("Twin Breakout headless match starting...");

        let mut lobby = Lobby::new();
        let mut seats = vec![Seat::new(1, true), Seat::new(2, false)];

        for i in 0..seats.len() {
            seats[i].peer.connect();
            seats[i].peer.handle_open();
            let joined = lobby.join(seats[i].id);
            deliver(&mut seats, joined);
        }

        let mut frames = 0;
        while frames < MAX_FRAMES {
            for seat in seats.iter_mut() {
                let input = seat.input();
                seat.peer.tick(&input);
            }
            route(&lobby, &mut seats);
            frames += 1;

            let decided = seats
                .iter()
                .all(|s| s.peer.session().local().phase() != Phase::Playing);
            if decided {
                break;
            }
        }

        log::info!("Match ended after {} frames", frames);
        for (seat, other) in [(&seats[0], &seats[1]), (&seats[1], &seats[0])] {
            let local = seat.peer.session().local();
            let seen = other.peer.session().mirror();
            log::info!(
                "Player {}: {:?}, {} lives, {} bricks left (opponent sees {:?}, {} lives, {} bricks), {:?}",
                seat.id,
                local.phase(),
                local.lives(),
                local.board().bricks.len(),
                seen.phase(),
                seen.lives(),
                seen.board().bricks.len(),
                seat.peer.channel().stats(),
            );
        }

        for seat in seats.iter_mut() {
            seat.peer.disconnect();
            lobby.leave(seat.id);
        }
    }
}
