/// System tray icon with a small context menu.
/// Uses Win32 Shell_NotifyIconW directly; other platforms get a no-op stub.

#[cfg(windows)]
use std::cell::Cell;
use std::cell::RefCell;
use std::rc::Rc;

#[cfg(windows)]
use windows::Win32::Foundation::{HINSTANCE, HWND, LPARAM, LRESULT, POINT, WPARAM};
#[cfg(windows)]
use windows::Win32::UI::Shell::{
    Shell_NotifyIconW, NIF_ICON, NIF_MESSAGE, NIF_TIP, NIM_ADD, NIM_DELETE, NIM_MODIFY,
    NOTIFYICONDATAW,
};
#[cfg(windows)]
use windows::Win32::UI::WindowsAndMessaging::{
    AppendMenuW, CreatePopupMenu, CreateWindowExW, DefWindowProcW, DestroyMenu, DestroyWindow,
    GetCursorPos, LoadIconW, RegisterClassW, SetForegroundWindow, TrackPopupMenu, CS_HREDRAW,
    CS_VREDRAW, HMENU, IDI_APPLICATION, MF_SEPARATOR, MF_STRING, TPM_BOTTOMALIGN, TPM_LEFTALIGN,
    WM_COMMAND, WM_DESTROY, WM_USER, WNDCLASSW, WS_EX_TOOLWINDOW,
};

use glam::UVec2;

use crate::sink::{DisplaySink, FrameChanged};
use crate::sprite::{FrameRect, SpriteSheet};

/// Custom message ID for tray icon callbacks.
#[cfg(windows)]
const WM_TRAYICON: u32 = WM_USER + 1;
#[cfg(windows)]
const WM_LBUTTONUP: u32 = 0x0202;
#[cfg(windows)]
const WM_RBUTTONUP: u32 = 0x0205;

/// Menu item IDs.
#[cfg(windows)]
const ID_ENLARGED_VIEW: u16 = 1000;
#[cfg(windows)]
const ID_QUIT: u16 = 1001;

const TOOLTIP_PREFIX: &str = "Sprite Follower";

/// Commands returned from tray interactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayCommand {
    None,
    ToggleEnlargedView,
    Quit,
}

#[cfg(windows)]
thread_local! {
    /// Set by the tray window procedure, taken by `TrayIcon::poll`.
    static PENDING: Cell<TrayCommand> = const { Cell::new(TrayCommand::None) };
}

/// System tray icon state.
pub struct TrayIcon {
    #[cfg(windows)]
    hwnd: HWND,
    #[cfg(windows)]
    nid: NOTIFYICONDATAW,
    removed: bool,
}

#[cfg(windows)]
impl TrayIcon {
    pub fn new() -> Self {
        unsafe {
            // Hidden window class for receiving tray messages.
            let class_name: Vec<u16> = "SpriteFollowerTrayClass\0".encode_utf16().collect();
            let wc = WNDCLASSW {
                style: CS_HREDRAW | CS_VREDRAW,
                lpfnWndProc: Some(tray_wnd_proc),
                lpszClassName: windows::core::PCWSTR(class_name.as_ptr()),
                ..Default::default()
            };
            RegisterClassW(&wc);

            let hwnd = CreateWindowExW(
                WS_EX_TOOLWINDOW,
                windows::core::PCWSTR(class_name.as_ptr()),
                windows::core::PCWSTR::null(),
                Default::default(),
                0,
                0,
                0,
                0,
                HWND::default(),
                HMENU::default(),
                HINSTANCE::default(),
                None,
            )
            .unwrap_or_else(|e| {
                log::warn!("Tray message window unavailable: {e}");
                HWND::default()
            });

            let mut nid = NOTIFYICONDATAW::default();
            nid.cbSize = std::mem::size_of::<NOTIFYICONDATAW>() as u32;
            nid.hWnd = hwnd;
            nid.uID = 1;
            nid.uFlags = NIF_ICON | NIF_MESSAGE | NIF_TIP;
            nid.uCallbackMessage = WM_TRAYICON;
            nid.hIcon = LoadIconW(None, IDI_APPLICATION).unwrap_or_default();
            write_tip(&mut nid, TOOLTIP_PREFIX);

            let _ = Shell_NotifyIconW(NIM_ADD, &nid);
            log::info!("System tray icon created");

            Self {
                hwnd,
                nid,
                removed: false,
            }
        }
    }

    /// Take the command from the last menu interaction, if any.
    pub fn poll(&mut self) -> TrayCommand {
        PENDING.with(|p| p.replace(TrayCommand::None))
    }

    /// Show `text` as the icon's hover tooltip.
    pub fn set_tooltip(&mut self, text: &str) {
        if self.removed {
            return;
        }
        write_tip(&mut self.nid, text);
        self.nid.uFlags = NIF_TIP;
        unsafe {
            let _ = Shell_NotifyIconW(NIM_MODIFY, &self.nid);
        }
    }

    /// Remove the tray icon (called on shutdown).
    pub fn remove(&mut self) {
        if std::mem::replace(&mut self.removed, true) {
            return;
        }
        unsafe {
            let _ = Shell_NotifyIconW(NIM_DELETE, &self.nid);
            let _ = DestroyWindow(self.hwnd);
        }
        log::info!("System tray icon removed");
    }
}

#[cfg(windows)]
fn write_tip(nid: &mut NOTIFYICONDATAW, text: &str) {
    nid.szTip = [0; 128];
    for (i, ch) in text.encode_utf16().enumerate() {
        if i >= nid.szTip.len() - 1 {
            break;
        }
        nid.szTip[i] = ch;
    }
}

/// Window procedure for the hidden tray message window.
#[cfg(windows)]
unsafe extern "system" fn tray_wnd_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    if msg == WM_TRAYICON {
        match (lparam.0 & 0xFFFF) as u32 {
            WM_LBUTTONUP => {
                PENDING.with(|p| p.set(TrayCommand::ToggleEnlargedView));
                return LRESULT(0);
            }
            WM_RBUTTONUP => {
                show_context_menu(hwnd);
                return LRESULT(0);
            }
            _ => {}
        }
    }
    if msg == WM_COMMAND {
        let command = match (wparam.0 & 0xFFFF) as u16 {
            ID_ENLARGED_VIEW => TrayCommand::ToggleEnlargedView,
            ID_QUIT => TrayCommand::Quit,
            _ => TrayCommand::None,
        };
        PENDING.with(|p| p.set(command));
        return LRESULT(0);
    }
    if msg == WM_DESTROY {
        return LRESULT(0);
    }
    DefWindowProcW(hwnd, msg, wparam, lparam)
}

/// Show the right-click context menu at the cursor position.
#[cfg(windows)]
unsafe fn show_context_menu(hwnd: HWND) {
    let Ok(hmenu) = CreatePopupMenu() else {
        return;
    };

    let open_label: Vec<u16> = "Open Enlarged View\0".encode_utf16().collect();
    let _ = AppendMenuW(
        hmenu,
        MF_STRING,
        ID_ENLARGED_VIEW as usize,
        windows::core::PCWSTR(open_label.as_ptr()),
    );

    let _ = AppendMenuW(hmenu, MF_SEPARATOR, 0, windows::core::PCWSTR::null());

    let quit_label: Vec<u16> = "Quit\0".encode_utf16().collect();
    let _ = AppendMenuW(
        hmenu,
        MF_STRING,
        ID_QUIT as usize,
        windows::core::PCWSTR(quit_label.as_ptr()),
    );

    let mut pt = POINT::default();
    let _ = GetCursorPos(&mut pt);

    // Required so menu closes when clicking outside
    let _ = SetForegroundWindow(hwnd);

    let _ = TrackPopupMenu(
        hmenu,
        TPM_LEFTALIGN | TPM_BOTTOMALIGN,
        pt.x,
        pt.y,
        0,
        hwnd,
        None,
    );

    let _ = DestroyMenu(hmenu);
}

// Non-windows stub
#[cfg(not(windows))]
impl TrayIcon {
    pub fn new() -> Self {
        log::info!("No system tray on this platform");
        Self { removed: false }
    }
    pub fn poll(&mut self) -> TrayCommand {
        TrayCommand::None
    }
    pub fn set_tooltip(&mut self, text: &str) {
        log::trace!("tray tooltip: {text}");
    }
    pub fn remove(&mut self) {
        self.removed = true;
    }
}

impl Drop for TrayIcon {
    fn drop(&mut self) {
        self.remove();
    }
}

/// Mirrors the current pose into the tray tooltip.
///
/// Pixels are not drawn: the sink resolves each frame's sheet rect and the
/// icon size it would be scaled to and reports them at trace level.
pub struct TraySink {
    tray: Rc<RefCell<TrayIcon>>,
    frames: Vec<FrameRect>,
    icon: UVec2,
}

impl TraySink {
    pub fn new(
        tray: Rc<RefCell<TrayIcon>>,
        sheet: SpriteSheet,
        icon_size: u32,
    ) -> Self {
        Self {
            tray,
            frames: sheet.frames(),
            icon: sheet.scale_to(icon_size),
        }
    }
}

impl DisplaySink for TraySink {
    fn frame_changed(&mut self, event: &FrameChanged) {
        if let Some(src) = self.frames.get(event.index) {
            log::trace!("tray icon <- sheet {:?} at {:?}", src, self.icon);
        }
        let tip = format!("{TOOLTIP_PREFIX} - {}", event.pose_label());
        self.tray.borrow_mut().set_tooltip(&tip);
    }
}
