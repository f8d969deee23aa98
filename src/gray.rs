//! Grayscale plane scheduler
//!
//! [`GrayDisplay`] shows one bit-plane per frame timer period and cycles
//! through the planes of the configured [`PlaneMode`]. Each period the
//! application renders the plane reported by [`current_plane`] into the
//! framebuffer, then calls [`wait_for_next_plane`] (or polls
//! [`next_plane`]) which streams it out in sync with the panel row scan.
//!
//! The row scan is hidden with a park-row trick: the multiplex ratio is
//! dropped to 1 so the controller keeps driving a single row while the new
//! plane is written, then restored so the whole plane is scanned once.
//!
//! [`current_plane`]: GrayDisplay::current_plane
//! [`wait_for_next_plane`]: GrayDisplay::wait_for_next_plane
//! [`next_plane`]: GrayDisplay::next_plane
//!
//! ## Example
//!
//! ```rust,no_run
//! use ssd1306_gray::{
//!     Builder, Display, FrameScheduler, FrameTimer, Interface, Shade, WaitForInterrupt,
//! };
//! # use core::convert::Infallible;
//! # use embedded_hal::digital::OutputPin;
//! # use embedded_hal::spi::{Operation, SpiDevice};
//! # struct MockSpi;
//! # impl embedded_hal::spi::ErrorType for MockSpi { type Error = Infallible; }
//! # impl SpiDevice for MockSpi {
//! #     fn transaction(
//! #         &mut self,
//! #         _operations: &mut [Operation<'_, u8>],
//! #     ) -> Result<(), Self::Error> {
//! #         Ok(())
//! #     }
//! # }
//! # struct MockPin;
//! # impl embedded_hal::digital::ErrorType for MockPin { type Error = Infallible; }
//! # impl OutputPin for MockPin {
//! #     fn set_low(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! #     fn set_high(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # struct Timer;
//! # impl FrameTimer for Timer {
//! #     fn start(&mut self, _: u16) {}
//! #     fn set_compare(&mut self, _: u16) {}
//! # }
//! # struct Wfi;
//! # impl WaitForInterrupt for Wfi { fn wait_for_interrupt(&mut self) {} }
//! static SCHEDULER: FrameScheduler = FrameScheduler::new();
//!
//! let config = match Builder::new().build() {
//!     Ok(config) => config,
//!     Err(_) => return,
//! };
//! let display = Display::new(Interface::new(MockSpi, MockPin, MockPin), config);
//! let mut gray = match display.start_gray(&SCHEDULER, &mut Timer) {
//!     Ok(gray) => gray,
//!     Err(_) => return,
//! };
//!
//! let mut buffer = [0u8; 1024];
//! loop {
//!     if gray.needs_update() {
//!         // advance game state
//!     }
//!     // draw with gray.color(shade) as the pixel value
//!     let _lit = gray.color(Shade::GRAY);
//!     let _ = gray.wait_for_next_plane(&mut buffer, Shade::Black, &mut Wfi);
//! }
//! ```

use log::debug;

use crate::cadence::{UpdateCadence, update_fraction};
use crate::color::Shade;
use crate::command::{
    CHARGE_PUMP, CHARGE_PUMP_OFF, CHARGE_PUMP_ON, CLOCK_DIV_FAST, CLOCK_DIV_SLOWEST, PAGE_ADDRESS,
    PRECHARGE_SLOW_DRIVE_RESTORE, PRECHARGE_SLOWEST, SET_CLOCK_DIV, SET_CONTRAST, SET_MULTIPLEX,
    SET_PRECHARGE,
};
use crate::config::{BUFFER_SIZE, Config, PlaneContrast, SyncStrategy};
use crate::error::Error;
use crate::interface::DisplayInterface;
use crate::painter::{Clear, Paint, Painter};
use crate::plane::{PlaneMode, plane_color};
use crate::scheduler::{FrameScheduler, WaitForInterrupt};

type DisplayResult<I> = core::result::Result<(), Error<I>>;

/// Last framebuffer page, the one shown while the row scan is parked
const PARK_PAGE: u8 = 7;

/// Multiplex ratio that parks the row scan on row 0
const PARKED: u8 = 0;
/// Multiplex ratio that drives all 64 rows
const ALL_ROWS: u8 = 63;
/// Multiplex ratio that drives the park page only (three-phase)
const PARK_PAGE_ROWS: u8 = 7;

/// Page window covering the whole panel
const FULL_PAGE_WINDOW: [u8; 3] = [PAGE_ADDRESS, 0, 7];

/// Grayscale display driver
///
/// Created by [`Display::start_gray`](crate::Display::start_gray). Owns the
/// interface, the plane index, the update cadence and the contrast state.
/// The frame timer interrupt only touches the shared [`FrameScheduler`].
pub struct GrayDisplay<'s, I>
where
    I: DisplayInterface,
{
    interface: I,
    config: Config,
    scheduler: &'s FrameScheduler,
    painter: Painter,
    /// Plane index within the cycle, before any L3 conversion
    plane: u8,
    cadence: UpdateCadence,
    contrast: u8,
    plane_contrast: Option<PlaneContrast>,
}

impl<'s, I> GrayDisplay<'s, I>
where
    I: DisplayInterface,
{
    pub(crate) fn new(interface: I, config: Config, scheduler: &'s FrameScheduler) -> Self {
        Self {
            painter: Painter::new(config.controller),
            cadence: UpdateCadence::new(config.update_every_n, config.update_denom),
            contrast: config.contrast,
            plane_contrast: config.plane_contrast,
            plane: 0,
            interface,
            config,
            scheduler,
        }
    }

    /// Plane the application should render next
    ///
    /// With an L3 conversion this is the triplane plane being shown, so
    /// triplane artwork can be drawn unchanged.
    pub fn current_plane(&self) -> u8 {
        match self.config.mode {
            PlaneMode::L4Triplane => self.config.l3_conversion.effective_plane(self.plane),
            PlaneMode::L4Contrast | PlaneMode::L3 => self.plane,
        }
    }

    /// Whether game logic should run, consuming the update if so
    pub fn needs_update(&mut self) -> bool {
        self.cadence.needs_update()
    }

    /// Run logic updates every `every_n / denom` plane cycles
    ///
    /// Pending updates are discarded. Zero for either value is treated as 1.
    pub fn set_update_every_n(&mut self, every_n: u8, denom: u8) {
        debug!("update cadence {}/{}", every_n, denom);
        self.cadence.set_every_n(every_n, denom);
    }

    /// Run logic updates `hz` times per second, at most once per refresh
    pub fn set_update_hz(&mut self, hz: u8) {
        let (every_n, denom) = update_fraction(self.config.refresh_hz, self.config.planes(), hz);
        self.set_update_every_n(every_n, denom);
    }

    /// Set contrast for [`PlaneMode::L4Contrast`]
    ///
    /// Odd planes are shown at `contrast`, even planes at half of it.
    pub fn set_contrast(&mut self, contrast: u8) -> DisplayResult<I> {
        if self.config.mode != PlaneMode::L4Contrast {
            return Err(Error::Unsupported {
                operation: "set_contrast",
                mode: self.config.mode,
            });
        }
        self.contrast = contrast;
        Ok(())
    }

    /// Set the contrast used while `plane` is shown
    ///
    /// Requires per-plane contrast to have been enabled with
    /// [`Builder::plane_contrast`](crate::Builder::plane_contrast).
    pub fn set_plane_contrast(&mut self, plane: u8, contrast: u8) -> DisplayResult<I> {
        let mode = self.config.mode;
        let Some(tables) = self.plane_contrast.as_mut() else {
            return Err(Error::Unsupported {
                operation: "set_plane_contrast",
                mode,
            });
        };
        let planes = mode.num_planes();
        let slot = match mode {
            PlaneMode::L3 => tables.l3.get_mut(plane as usize),
            PlaneMode::L4Triplane => tables.l4.get_mut(plane as usize),
            PlaneMode::L4Contrast => None,
        };
        match slot {
            Some(slot) => {
                *slot = contrast;
                Ok(())
            }
            None => Err(Error::InvalidPlane { plane, planes }),
        }
    }

    /// Whether `shade` is lit on the current plane
    pub fn color(&self, shade: Shade) -> bool {
        plane_color(self.config.mode, self.current_plane(), shade)
    }

    /// Run one display step if the frame timer has ticked
    ///
    /// Returns `Ok(false)` without touching anything when no tick is
    /// pending. Otherwise performs the step and returns whether it completed
    /// the plane, meaning the buffer has been sent, cleared to `clear` and
    /// [`current_plane`](Self::current_plane) has advanced.
    pub fn next_plane(&mut self, buffer: &mut [u8], clear: Shade) -> Result<bool, Error<I>> {
        check_buffer(buffer)?;
        let scheduler = self.scheduler;
        match critical_section::with(|cs| scheduler.take_pending(cs)) {
            Some(phase) => self.step(buffer, clear, phase),
            None => Ok(false),
        }
    }

    /// Sleep until the current plane has been shown, then advance
    ///
    /// The pending flag is checked with interrupts masked and, if clear,
    /// `waiter` is called before they are unmasked, so a tick between the
    /// check and the sleep cannot be lost. Each wait gets its own critical
    /// section; leaving it lets the woken frame interrupt run before the
    /// flag is checked again. In the three-phase strategy this returns after
    /// the third phase.
    pub fn wait_for_next_plane<W: WaitForInterrupt>(
        &mut self,
        buffer: &mut [u8],
        clear: Shade,
        waiter: &mut W,
    ) -> DisplayResult<I> {
        check_buffer(buffer)?;
        let scheduler = self.scheduler;
        loop {
            let pending = critical_section::with(|cs| {
                let pending = scheduler.take_pending(cs);
                if pending.is_none() {
                    waiter.wait_for_interrupt();
                }
                pending
            });
            if let Some(phase) = pending {
                if self.step(buffer, clear, phase)? {
                    return Ok(());
                }
            }
        }
    }

    /// Configured plane mode
    pub fn plane_mode(&self) -> PlaneMode {
        self.config.mode
    }

    /// Configured sync strategy
    pub fn sync_strategy(&self) -> SyncStrategy {
        self.config.sync
    }

    /// Number of rows that are shown
    pub fn usable_height(&self) -> u8 {
        self.config.sync.usable_height()
    }

    /// Get reference to the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Release the interface
    ///
    /// The frame timer keeps running; stop it before reusing the panel.
    pub fn release(self) -> I {
        self.interface
    }

    fn step(&mut self, buffer: &mut [u8], clear: Shade, phase: u8) -> Result<bool, Error<I>> {
        let fill = self.clear_fill(clear);
        match self.config.sync {
            SyncStrategy::ThreePhase => self.step_three_phase(buffer, fill, phase),
            SyncStrategy::ParkRow => {
                self.send_contrast()?;
                self.paint(buffer, Paint::page(PARK_PAGE).clear(fill).mask(0x7F))?;
                self.send_commands(&[SET_MULTIPLEX, ALL_ROWS])?;
                self.paint(buffer, Paint::pages(0, 7).clear(fill).panel_start(1))?;
                self.send_commands(&[SET_MULTIPLEX, PARKED])?;
                self.advance();
                Ok(true)
            }
            SyncStrategy::SlowDrive => {
                self.send_contrast()?;
                critical_section::with(|_| {
                    // Stall the row drive while the park page is rewritten
                    self.send_commands(&[
                        PAGE_ADDRESS,
                        0,
                        7,
                        CHARGE_PUMP,
                        CHARGE_PUMP_OFF,
                        SET_CLOCK_DIV,
                        CLOCK_DIV_SLOWEST,
                        SET_PRECHARGE,
                        PRECHARGE_SLOWEST,
                    ])?;
                    self.paint(buffer, Paint::page(PARK_PAGE))?;
                    self.send_commands(&[
                        SET_MULTIPLEX,
                        ALL_ROWS,
                        CHARGE_PUMP,
                        CHARGE_PUMP_ON,
                        SET_PRECHARGE,
                        PRECHARGE_SLOW_DRIVE_RESTORE,
                        SET_CLOCK_DIV,
                        CLOCK_DIV_FAST,
                    ])
                })?;
                self.paint(buffer, Paint::pages(0, 7).clear(fill).panel_start(1))?;
                self.send_commands(&[SET_MULTIPLEX, PARKED])?;
                self.paint(buffer, Paint::page(PARK_PAGE).clear(fill).mask(0x00))?;
                self.advance();
                Ok(true)
            }
        }
    }

    fn step_three_phase(
        &mut self,
        buffer: &mut [u8],
        fill: Clear,
        phase: u8,
    ) -> Result<bool, Error<I>> {
        match phase {
            1 => {
                self.send_contrast()?;
                self.send_commands(&[SET_MULTIPLEX, PARK_PAGE_ROWS])?;
                self.send_commands(&FULL_PAGE_WINDOW)?;
                Ok(false)
            }
            2 => {
                self.paint(buffer, Paint::page(PARK_PAGE).mask(0xF0))?;
                self.send_commands(&FULL_PAGE_WINDOW)?;
                Ok(false)
            }
            3 => {
                self.send_commands(&FULL_PAGE_WINDOW)?;
                self.paint(buffer, Paint::page(PARK_PAGE))?;
                self.send_commands(&[SET_MULTIPLEX, PARKED])?;
                self.paint(buffer, Paint::pages(0, 7).clear(fill).panel_start(1))?;
                self.paint(buffer, Paint::page(PARK_PAGE).clear(fill).mask(0x00))?;
                self.advance();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Fill byte for the cleared buffer, chosen for the plane drawn next
    fn clear_fill(&self, clear: Shade) -> Clear {
        let planes = self.config.planes();
        let next = if self.plane + 1 >= planes {
            0
        } else {
            self.plane + 1
        };
        let next = match self.config.mode {
            PlaneMode::L4Triplane => self.config.l3_conversion.effective_plane(next),
            PlaneMode::L4Contrast | PlaneMode::L3 => next,
        };
        if plane_color(self.config.mode, next, clear) {
            Clear::Fill(0xFF)
        } else {
            Clear::Fill(0x00)
        }
    }

    /// Contrast for the plane being shown, if the mode varies it
    fn plane_contrast_value(&self) -> Option<u8> {
        let plane = self.current_plane();
        match (self.config.mode, self.plane_contrast) {
            (PlaneMode::L4Contrast, _) => Some(if plane & 1 != 0 {
                self.contrast
            } else {
                self.contrast / 2
            }),
            (PlaneMode::L3, Some(tables)) => Some(tables.l3[(plane & 1) as usize]),
            (PlaneMode::L4Triplane, Some(tables)) => Some(if plane & 2 != 0 {
                tables.l4[2]
            } else if plane & 1 != 0 {
                tables.l4[1]
            } else {
                tables.l4[0]
            }),
            (PlaneMode::L3 | PlaneMode::L4Triplane, None) => None,
        }
    }

    fn send_contrast(&mut self) -> DisplayResult<I> {
        match self.plane_contrast_value() {
            Some(contrast) => self.send_commands(&[SET_CONTRAST, contrast]),
            None => Ok(()),
        }
    }

    fn advance(&mut self) {
        self.plane += 1;
        if self.plane >= self.config.planes() {
            self.plane = 0;
            self.cadence.record_cycle();
        }
    }

    fn paint(&mut self, buffer: &mut [u8], paint: Paint) -> DisplayResult<I> {
        self.painter.paint(&mut self.interface, buffer, paint)
    }

    fn send_commands(&mut self, commands: &[u8]) -> DisplayResult<I> {
        self.interface
            .send_commands(commands)
            .map_err(Error::Interface)
    }
}

fn check_buffer<I: DisplayInterface>(buffer: &[u8]) -> DisplayResult<I> {
    if buffer.len() < BUFFER_SIZE {
        return Err(Error::BufferTooSmall {
            required: BUFFER_SIZE,
            provided: buffer.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Builder, Controller};
    use crate::display::Display;
    use crate::plane::L3Conversion;
    use crate::scheduler::FrameTimer;
    use alloc::vec::Vec;
    use embedded_hal::delay::DelayNs;

    extern crate std;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc;
    use std::thread;

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Commands(Vec<u8>),
        Data(Vec<u8>),
    }

    #[derive(Debug, Default)]
    struct MockInterface {
        events: Vec<Event>,
    }

    impl MockInterface {
        fn commands(&self) -> Vec<Vec<u8>> {
            self.events
                .iter()
                .filter_map(|e| match e {
                    Event::Commands(c) => Some(c.clone()),
                    Event::Data(_) => None,
                })
                .collect()
        }
    }

    impl DisplayInterface for MockInterface {
        type Error = core::convert::Infallible;

        fn send_commands(&mut self, commands: &[u8]) -> Result<(), Self::Error> {
            self.events.push(Event::Commands(commands.to_vec()));
            Ok(())
        }

        fn send_data(&mut self, data: &[u8]) -> Result<(), Self::Error> {
            self.events.push(Event::Data(data.to_vec()));
            Ok(())
        }

        fn reset<D: DelayNs>(&mut self, _delay: &mut D) {}
    }

    struct NullTimer;
    impl FrameTimer for NullTimer {
        fn start(&mut self, _compare: u16) {}
        fn set_compare(&mut self, _compare: u16) {}
    }

    /// Counts sleeps without an interrupt source
    #[derive(Default)]
    struct CountingWaiter {
        sleeps: usize,
    }

    impl WaitForInterrupt for CountingWaiter {
        fn wait_for_interrupt(&mut self) {
            self.sleeps += 1;
        }
    }

    /// Raises the frame interrupt on a separate thread
    ///
    /// That thread can only run the handler once the sleeping side has left
    /// its critical section, like a pending interrupt on a masked core.
    struct InterruptLine<'a> {
        raise: mpsc::Sender<()>,
        serviced: &'a AtomicUsize,
        raised: usize,
        wakeups: usize,
    }

    impl WaitForInterrupt for InterruptLine<'_> {
        fn wait_for_interrupt(&mut self) {
            if self.serviced.load(Ordering::SeqCst) < self.raised {
                // Still pending, so the core wakes at once
                self.wakeups += 1;
                assert!(self.wakeups < 10_000_000, "frame interrupt never ran");
                return;
            }
            self.raised += 1;
            let _ = self.raise.send(());
        }
    }

    fn start(builder: Builder, scheduler: &FrameScheduler) -> GrayDisplay<'_, MockInterface> {
        let display = Display::new(MockInterface::default(), builder.build().unwrap());
        let mut gray = display.start_gray(scheduler, &mut NullTimer).unwrap();
        gray.interface.events.clear();
        gray
    }

    fn cmd(bytes: &[u8]) -> Event {
        Event::Commands(bytes.to_vec())
    }

    fn data(byte: u8) -> Event {
        Event::Data(alloc::vec![byte; 128])
    }

    #[test]
    fn test_poll_without_tick_does_nothing() {
        let scheduler = FrameScheduler::new();
        let mut gray = start(Builder::new(), &scheduler);
        let mut buffer = alloc::vec![0xFFu8; BUFFER_SIZE];

        assert!(!gray.next_plane(&mut buffer, Shade::Black).unwrap());
        assert!(gray.interface.events.is_empty());
        assert_eq!(gray.current_plane(), 0);
        assert!(buffer.iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn test_three_phase_cycle() {
        let scheduler = FrameScheduler::new();
        let mut gray = start(Builder::new(), &scheduler);
        let mut buffer = alloc::vec![0xFFu8; BUFFER_SIZE];

        scheduler.on_timer_interrupt();
        assert!(!gray.next_plane(&mut buffer, Shade::Black).unwrap());
        scheduler.on_timer_interrupt();
        assert!(!gray.next_plane(&mut buffer, Shade::Black).unwrap());
        scheduler.on_timer_interrupt();
        assert!(gray.next_plane(&mut buffer, Shade::Black).unwrap());

        let mut expected = alloc::vec![
            // phase 1
            cmd(&[0xA8, 7]),
            cmd(&[0x22, 0, 7]),
            // phase 2: top half of the park page, bit reversed
            data(0x0F),
            cmd(&[0x22, 0, 7]),
            // phase 3
            cmd(&[0x22, 0, 7]),
            data(0xFF),
            cmd(&[0xA8, 0]),
        ];
        expected.extend((0..7).map(|_| data(0xFF)));
        expected.push(data(0x00));
        assert_eq!(gray.interface.events, expected);

        assert_eq!(gray.current_plane(), 1);
        assert_eq!(scheduler.phase(), 3);
        assert!(buffer.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_park_row_step() {
        let scheduler = FrameScheduler::new();
        let mut gray = start(Builder::new().sync(SyncStrategy::ParkRow), &scheduler);
        let mut buffer = alloc::vec![0xFFu8; BUFFER_SIZE];

        scheduler.on_timer_interrupt();
        assert!(gray.next_plane(&mut buffer, Shade::Black).unwrap());

        let mut expected = alloc::vec![data(0xFE), cmd(&[0xA8, 63])];
        expected.extend((0..7).map(|_| data(0xFF)));
        expected.push(cmd(&[0xA8, 0]));
        assert_eq!(gray.interface.events, expected);
        assert!(buffer.iter().all(|&b| b == 0));
        assert_eq!(gray.usable_height(), 63);
    }

    #[test]
    fn test_slow_drive_step() {
        let scheduler = FrameScheduler::new();
        let mut gray = start(Builder::new().sync(SyncStrategy::SlowDrive), &scheduler);
        let mut buffer = alloc::vec![0xFFu8; BUFFER_SIZE];

        scheduler.on_timer_interrupt();
        assert!(gray.next_plane(&mut buffer, Shade::Black).unwrap());

        let mut expected = alloc::vec![
            cmd(&[0x22, 0, 7, 0x8D, 0x00, 0xD5, 0x0F, 0xD9, 0xFF]),
            data(0xFF),
            cmd(&[0xA8, 63, 0x8D, 0x14, 0xD9, 0x31, 0xD5, 0xF0]),
        ];
        expected.extend((0..7).map(|_| data(0xFF)));
        expected.push(cmd(&[0xA8, 0]));
        expected.push(data(0x00));
        assert_eq!(gray.interface.events, expected);
        assert!(buffer.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_clear_uses_next_plane_color() {
        let scheduler = FrameScheduler::new();
        let mut gray = start(Builder::new().sync(SyncStrategy::ParkRow), &scheduler);
        let mut buffer = alloc::vec![0x55u8; BUFFER_SIZE];

        // Plane 0 shown, plane 1 next: gray is unlit on plane 1
        scheduler.on_timer_interrupt();
        gray.next_plane(&mut buffer, Shade::GRAY).unwrap();
        assert!(buffer.iter().all(|&b| b == 0x00));

        // Plane 1 shown, plane 0 next: gray is lit on plane 0
        scheduler.on_timer_interrupt();
        gray.next_plane(&mut buffer, Shade::GRAY).unwrap();
        assert!(buffer.iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn test_contrast_mode_alternates_contrast() {
        let scheduler = FrameScheduler::new();
        let mut gray = start(
            Builder::new()
                .mode(PlaneMode::L4Contrast)
                .sync(SyncStrategy::ParkRow),
            &scheduler,
        );
        let mut buffer = alloc::vec![0u8; BUFFER_SIZE];

        for _ in 0..2 {
            scheduler.on_timer_interrupt();
            gray.next_plane(&mut buffer, Shade::Black).unwrap();
        }
        gray.set_contrast(100).unwrap();
        scheduler.on_timer_interrupt();
        gray.next_plane(&mut buffer, Shade::Black).unwrap();

        let contrast: Vec<Vec<u8>> = gray
            .interface
            .commands()
            .into_iter()
            .filter(|c| c[0] == 0x81)
            .collect();
        assert_eq!(
            contrast,
            alloc::vec![
                alloc::vec![0x81, 127],
                alloc::vec![0x81, 255],
                alloc::vec![0x81, 50]
            ]
        );
    }

    #[test]
    fn test_three_phase_sends_contrast_in_first_phase_only() {
        let scheduler = FrameScheduler::new();
        let mut gray = start(Builder::new().mode(PlaneMode::L4Contrast), &scheduler);
        let mut buffer = alloc::vec![0u8; BUFFER_SIZE];

        scheduler.on_timer_interrupt();
        gray.next_plane(&mut buffer, Shade::Black).unwrap();
        assert_eq!(gray.interface.events[0], cmd(&[0x81, 127]));

        gray.interface.events.clear();
        scheduler.on_timer_interrupt();
        gray.next_plane(&mut buffer, Shade::Black).unwrap();
        scheduler.on_timer_interrupt();
        gray.next_plane(&mut buffer, Shade::Black).unwrap();
        assert!(gray.interface.commands().iter().all(|c| c[0] != 0x81));
    }

    #[test]
    fn test_three_plane_park_row_completes_every_tick() {
        let scheduler = FrameScheduler::new();
        let mut gray = start(
            Builder::new()
                .mode(PlaneMode::L4Triplane)
                .sync(SyncStrategy::ParkRow),
            &scheduler,
        );
        let mut buffer = alloc::vec![0u8; BUFFER_SIZE];

        assert_eq!(gray.current_plane(), 0);
        let mut planes = Vec::new();
        for _ in 0..3 {
            scheduler.on_timer_interrupt();
            assert!(gray.next_plane(&mut buffer, Shade::Black).unwrap());
            planes.push(gray.current_plane());
        }
        assert_eq!(planes, alloc::vec![1, 2, 0]);
        assert!(gray.needs_update());
        assert!(!gray.needs_update());
    }

    #[test]
    fn test_triplane_plane_contrast() {
        let scheduler = FrameScheduler::new();
        let mut gray = start(
            Builder::new()
                .mode(PlaneMode::L4Triplane)
                .sync(SyncStrategy::ParkRow)
                .plane_contrast(PlaneContrast::default()),
            &scheduler,
        );
        let mut buffer = alloc::vec![0u8; BUFFER_SIZE];

        let mut planes = Vec::new();
        for _ in 0..4 {
            planes.push(gray.current_plane());
            scheduler.on_timer_interrupt();
            gray.next_plane(&mut buffer, Shade::Black).unwrap();
        }
        assert_eq!(planes, alloc::vec![0, 1, 2, 0]);

        let contrast: Vec<u8> = gray
            .interface
            .commands()
            .into_iter()
            .filter(|c| c[0] == 0x81)
            .map(|c| c[1])
            .collect();
        assert_eq!(contrast, alloc::vec![25, 85, 255, 25]);
    }

    #[test]
    fn test_set_plane_contrast() {
        let scheduler = FrameScheduler::new();
        let mut gray = start(
            Builder::new()
                .sync(SyncStrategy::ParkRow)
                .plane_contrast(PlaneContrast::default()),
            &scheduler,
        );
        let mut buffer = alloc::vec![0u8; BUFFER_SIZE];

        gray.set_plane_contrast(0, 10).unwrap();
        assert!(matches!(
            gray.set_plane_contrast(2, 10),
            Err(Error::InvalidPlane {
                plane: 2,
                planes: 2
            })
        ));

        scheduler.on_timer_interrupt();
        gray.next_plane(&mut buffer, Shade::Black).unwrap();
        assert_eq!(gray.interface.events[0], cmd(&[0x81, 10]));
    }

    #[test]
    fn test_contrast_setters_reject_wrong_mode() {
        let scheduler = FrameScheduler::new();
        let mut gray = start(Builder::new(), &scheduler);

        assert!(matches!(
            gray.set_contrast(10),
            Err(Error::Unsupported {
                operation: "set_contrast",
                mode: PlaneMode::L3
            })
        ));
        assert!(matches!(
            gray.set_plane_contrast(0, 10),
            Err(Error::Unsupported { .. })
        ));
    }

    #[test]
    fn test_cadence_counts_completed_cycles() {
        let scheduler = FrameScheduler::new();
        let mut gray = start(
            Builder::new()
                .mode(PlaneMode::L4Triplane)
                .sync(SyncStrategy::ParkRow),
            &scheduler,
        );
        let mut buffer = alloc::vec![0u8; BUFFER_SIZE];

        for _ in 0..2 {
            scheduler.on_timer_interrupt();
            gray.next_plane(&mut buffer, Shade::Black).unwrap();
            assert!(!gray.needs_update());
        }
        scheduler.on_timer_interrupt();
        gray.next_plane(&mut buffer, Shade::Black).unwrap();
        assert!(gray.needs_update());
        assert!(!gray.needs_update());
    }

    #[test]
    fn test_set_update_every_n_discards_backlog() {
        let scheduler = FrameScheduler::new();
        let mut gray = start(Builder::new().sync(SyncStrategy::ParkRow), &scheduler);
        let mut buffer = alloc::vec![0u8; BUFFER_SIZE];

        for _ in 0..4 {
            scheduler.on_timer_interrupt();
            gray.next_plane(&mut buffer, Shade::Black).unwrap();
        }
        gray.set_update_every_n(2, 1);
        assert!(!gray.needs_update());

        gray.set_update_hz(30);
        assert_eq!(gray.cadence.every_n(), 78);
        assert_eq!(gray.cadence.denom(), 30);
    }

    #[test]
    fn test_mix_conversion_reports_outer_planes() {
        let scheduler = FrameScheduler::new();
        let mut gray = start(
            Builder::new()
                .mode(PlaneMode::L4Triplane)
                .l3_conversion(L3Conversion::Mix)
                .sync(SyncStrategy::ParkRow),
            &scheduler,
        );
        let mut buffer = alloc::vec![0u8; BUFFER_SIZE];

        assert_eq!(gray.current_plane(), 0);
        assert!(gray.color(Shade::DarkGray));

        scheduler.on_timer_interrupt();
        gray.next_plane(&mut buffer, Shade::Black).unwrap();
        assert_eq!(gray.current_plane(), 2);
        assert!(!gray.color(Shade::LightGray));
        assert!(gray.color(Shade::White));

        scheduler.on_timer_interrupt();
        gray.next_plane(&mut buffer, Shade::Black).unwrap();
        assert_eq!(gray.current_plane(), 0);
        assert!(gray.needs_update());
    }

    #[test]
    fn test_wait_lets_frame_interrupt_run() {
        let scheduler = FrameScheduler::new();
        let serviced = AtomicUsize::new(0);
        let mut gray = start(Builder::new(), &scheduler);
        let mut buffer = alloc::vec![0u8; BUFFER_SIZE];
        let (raise, line) = mpsc::channel::<()>();

        thread::scope(|s| {
            s.spawn(|| {
                for () in line {
                    scheduler.on_timer_interrupt();
                    serviced.fetch_add(1, Ordering::SeqCst);
                }
            });

            let mut waiter = InterruptLine {
                raise,
                serviced: &serviced,
                raised: 0,
                wakeups: 0,
            };
            gray.wait_for_next_plane(&mut buffer, Shade::Black, &mut waiter)
                .unwrap();
            assert_eq!(waiter.raised, 3);
        });

        assert_eq!(serviced.load(Ordering::SeqCst), 3);
        assert_eq!(scheduler.phase(), 3);
        assert!(!scheduler.is_pending());
        assert_eq!(gray.current_plane(), 1);
    }

    #[test]
    fn test_wait_with_pending_tick_does_not_sleep() {
        let scheduler = FrameScheduler::new();
        let mut gray = start(Builder::new().sync(SyncStrategy::ParkRow), &scheduler);
        let mut buffer = alloc::vec![0u8; BUFFER_SIZE];
        let mut waiter = CountingWaiter::default();

        scheduler.on_timer_interrupt();
        gray.wait_for_next_plane(&mut buffer, Shade::Black, &mut waiter)
            .unwrap();

        assert_eq!(waiter.sleeps, 0);
        assert!(!scheduler.is_pending());
        assert_eq!(gray.current_plane(), 1);
    }

    #[test]
    fn test_short_buffer_keeps_tick_pending() {
        let scheduler = FrameScheduler::new();
        let mut gray = start(Builder::new().sync(SyncStrategy::ParkRow), &scheduler);
        let mut buffer = alloc::vec![0u8; 100];

        scheduler.on_timer_interrupt();
        assert!(matches!(
            gray.next_plane(&mut buffer, Shade::Black),
            Err(Error::BufferTooSmall { .. })
        ));
        assert!(scheduler.is_pending());
        assert!(gray.interface.events.is_empty());
    }

    #[test]
    fn test_sh1106_park_row_addresses_pages() {
        let scheduler = FrameScheduler::new();
        let mut gray = start(
            Builder::new()
                .controller(Controller::Sh1106)
                .sync(SyncStrategy::ParkRow),
            &scheduler,
        );
        let mut buffer = alloc::vec![0u8; BUFFER_SIZE];

        scheduler.on_timer_interrupt();
        gray.next_plane(&mut buffer, Shade::Black).unwrap();

        let pages: Vec<u8> = gray
            .interface
            .commands()
            .into_iter()
            .filter(|c| c.len() == 2 && c[1] == 0x10)
            .map(|c| c[0])
            .collect();
        assert_eq!(
            pages,
            alloc::vec![0xB0, 0xB1, 0xB2, 0xB3, 0xB4, 0xB5, 0xB6, 0xB7]
        );
    }
}
