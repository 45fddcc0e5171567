//! Terminal backed by the process's stdin/stdout.

use std::env;
use std::io;

use crate::core::terminal::{InputKind, InputUnit, Terminal};

#[cfg(unix)]
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

#[cfg(unix)]
use libc::{self, c_int};
#[cfg(unix)]
use tracing::{debug, warn};

/// `TERM` values that cannot handle cursor movement.
const UNSUPPORTED_TERMS: [&str; 3] = ["dumb", "cons25", "emacs"];

const DEFAULT_COLUMNS: usize = 80;
const DEFAULT_ROWS: usize = 24;

/// Poll interval while waiting for input, so a resize is noticed promptly.
#[cfg(unix)]
const INPUT_POLL_MS: c_int = 250;

pub fn is_unsupported_term(term: Option<&str>) -> bool {
    term.is_some_and(|term| {
        UNSUPPORTED_TERMS
            .iter()
            .any(|unsupported| term.eq_ignore_ascii_case(unsupported))
    })
}

#[cfg(unix)]
fn wait_writable(fd: c_int) -> io::Result<()> {
    let mut fds = libc::pollfd {
        fd,
        events: libc::POLLOUT,
        revents: 0,
    };
    loop {
        let result = unsafe { libc::poll(&mut fds, 1, -1) };
        if result < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                continue;
            }
            return Err(err);
        }
        if result == 0 {
            continue;
        }
        if (fds.revents & libc::POLLOUT) != 0 {
            return Ok(());
        }

        return Err(io::Error::other(format!(
            "poll(POLLOUT) returned revents=0x{:x}",
            fds.revents
        )));
    }
}

#[cfg(unix)]
fn write_all_fd_with<FWrite, FWait>(
    fd: c_int,
    bytes: &[u8],
    mut write_once: FWrite,
    mut wait_writable: FWait,
) -> io::Result<()>
where
    FWrite: FnMut(c_int, &[u8]) -> io::Result<usize>,
    FWait: FnMut(c_int) -> io::Result<()>,
{
    let mut written = 0;
    while written < bytes.len() {
        match write_once(fd, &bytes[written..]) {
            Ok(0) => {
                return Err(io::Error::new(io::ErrorKind::WriteZero, "write returned 0"));
            }
            Ok(count) => {
                if count > bytes.len() - written {
                    return Err(io::Error::other("write returned more bytes than requested"));
                }
                written += count;
            }
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => wait_writable(fd)?,
            Err(err) => return Err(err),
        }
    }
    Ok(())
}

#[cfg(unix)]
fn write_fd(fd: c_int, bytes: &[u8]) -> io::Result<()> {
    write_all_fd_with(
        fd,
        bytes,
        |fd, buf| {
            let result = unsafe { libc::write(fd, buf.as_ptr() as *const libc::c_void, buf.len()) };
            if result < 0 {
                Err(io::Error::last_os_error())
            } else {
                Ok(result as usize)
            }
        },
        wait_writable,
    )
}

#[cfg(unix)]
fn read_winsize(fd: c_int) -> Option<(usize, usize)> {
    let mut size = libc::winsize {
        ws_row: 0,
        ws_col: 0,
        ws_xpixel: 0,
        ws_ypixel: 0,
    };
    let result = unsafe { libc::ioctl(fd, libc::TIOCGWINSZ, &mut size) };
    if result == 0 && size.ws_col > 0 && size.ws_row > 0 {
        Some((usize::from(size.ws_col), usize::from(size.ws_row)))
    } else {
        None
    }
}

#[cfg(unix)]
fn poll_readable(fd: c_int, timeout_ms: c_int) -> io::Result<bool> {
    let mut fds = libc::pollfd {
        fd,
        events: libc::POLLIN,
        revents: 0,
    };
    let result = unsafe { libc::poll(&mut fds, 1, timeout_ms) };
    if result < 0 {
        return Err(io::Error::last_os_error());
    }
    if result == 0 {
        return Ok(false);
    }
    readiness(fds.revents)
}

/// Hangups and errors count as readable so the following `read` reports EOF or
/// the error. An invalid descriptor can never become readable.
#[cfg(unix)]
fn readiness(revents: libc::c_short) -> io::Result<bool> {
    if revents & libc::POLLNVAL != 0 {
        return Err(io::Error::from_raw_os_error(libc::EBADF));
    }
    Ok(revents & (libc::POLLIN | libc::POLLHUP | libc::POLLERR) != 0)
}

#[cfg(unix)]
fn get_termios(fd: c_int) -> io::Result<libc::termios> {
    let mut termios = unsafe { std::mem::zeroed::<libc::termios>() };
    let result = unsafe { libc::tcgetattr(fd, &mut termios) };
    if result != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(termios)
}

#[cfg(unix)]
fn set_termios(fd: c_int, termios: &libc::termios) -> io::Result<()> {
    let result = unsafe { libc::tcsetattr(fd, libc::TCSADRAIN, termios) };
    if result != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

/// Raw mode for line editing: no echo, no canonical buffering, no signal keys,
/// no output post-processing, 8-bit chars, one byte per read.
#[cfg(unix)]
fn make_raw(original: &libc::termios) -> libc::termios {
    let mut raw = *original;
    raw.c_iflag &= !(libc::BRKINT | libc::ICRNL | libc::INPCK | libc::ISTRIP | libc::IXON);
    raw.c_oflag &= !libc::OPOST;
    raw.c_cflag |= libc::CS8;
    raw.c_lflag &= !(libc::ECHO | libc::ICANON | libc::IEXTEN | libc::ISIG);
    raw.c_cc[libc::VMIN] = 1;
    raw.c_cc[libc::VTIME] = 0;
    raw
}

#[cfg(unix)]
fn is_tty(fd: c_int) -> bool {
    unsafe { libc::isatty(fd) == 1 }
}

#[cfg(unix)]
pub struct ProcessTerminal {
    stdin_fd: c_int,
    stdout_fd: c_int,
    original_termios: Option<libc::termios>,
    resized: Arc<AtomicBool>,
    resize_signal: Option<signal_hook::SigId>,
}

#[cfg(unix)]
impl ProcessTerminal {
    pub fn new() -> Self {
        Self::with_fds(libc::STDIN_FILENO, libc::STDOUT_FILENO)
    }

    pub(crate) fn with_fds(stdin_fd: c_int, stdout_fd: c_int) -> Self {
        let resized = Arc::new(AtomicBool::new(false));
        let resize_signal =
            match signal_hook::flag::register(libc::SIGWINCH, Arc::clone(&resized)) {
                Ok(id) => Some(id),
                Err(err) => {
                    warn!(error = %err, "failed to watch SIGWINCH; resizes will go unnoticed");
                    None
                }
            };
        Self {
            stdin_fd,
            stdout_fd,
            original_termios: None,
            resized,
            resize_signal,
        }
    }

    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut byte = 0u8;
        loop {
            let result =
                unsafe { libc::read(self.stdin_fd, &mut byte as *mut u8 as *mut libc::c_void, 1) };
            if result == 1 {
                return Ok(Some(byte));
            }
            if result == 0 {
                return Ok(None);
            }
            let err = io::Error::last_os_error();
            match err.kind() {
                io::ErrorKind::Interrupted => continue,
                io::ErrorKind::WouldBlock => {
                    poll_readable(self.stdin_fd, -1)?;
                }
                _ => return Err(err),
            }
        }
    }
}

#[cfg(unix)]
impl Default for ProcessTerminal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(unix)]
impl Drop for ProcessTerminal {
    fn drop(&mut self) {
        let _ = self.disable_raw_mode();
        if let Some(id) = self.resize_signal.take() {
            signal_hook::low_level::unregister(id);
        }
    }
}

#[cfg(unix)]
impl Terminal for ProcessTerminal {
    fn enable_raw_mode(&mut self) -> io::Result<()> {
        let original = match self.original_termios {
            Some(original) => original,
            None => {
                let original = get_termios(self.stdin_fd)?;
                self.original_termios = Some(original);
                original
            }
        };
        set_termios(self.stdin_fd, &make_raw(&original))?;
        debug!("raw mode enabled");
        Ok(())
    }

    fn disable_raw_mode(&mut self) -> io::Result<()> {
        if let Some(original) = self.original_termios.take() {
            set_termios(self.stdin_fd, &original)?;
            debug!("raw mode disabled");
        }
        Ok(())
    }

    fn read_unit(&mut self) -> io::Result<InputUnit> {
        loop {
            if self.resized.load(Ordering::Relaxed) {
                return Ok(InputUnit::Resized);
            }
            match poll_readable(self.stdin_fd, INPUT_POLL_MS) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            }
            return Ok(match self.read_byte()? {
                Some(byte) => InputUnit::Byte(byte),
                None => InputUnit::Eof,
            });
        }
    }

    fn write(&mut self, data: &[u8]) -> io::Result<()> {
        write_fd(self.stdout_fd, data)
    }

    fn columns(&self) -> usize {
        read_winsize(self.stdout_fd)
            .or_else(|| read_winsize(self.stdin_fd))
            .map_or(DEFAULT_COLUMNS, |(columns, _)| columns)
    }

    fn rows(&self) -> usize {
        read_winsize(self.stdout_fd)
            .or_else(|| read_winsize(self.stdin_fd))
            .map_or(DEFAULT_ROWS, |(_, rows)| rows)
    }

    fn take_resize(&mut self) -> bool {
        self.resized.swap(false, Ordering::Relaxed)
    }

    fn input_kind(&self) -> InputKind {
        if !is_tty(self.stdin_fd) {
            InputKind::NotATty
        } else if is_unsupported_term(env::var("TERM").ok().as_deref()) {
            InputKind::Unsupported
        } else {
            InputKind::Interactive
        }
    }

    fn output_is_tty(&self) -> bool {
        is_tty(self.stdout_fd)
    }
}

/// Portable fallback: plain reads from stdin, no editing.
#[cfg(not(unix))]
pub struct ProcessTerminal;

#[cfg(not(unix))]
impl ProcessTerminal {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(not(unix))]
impl Default for ProcessTerminal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(not(unix))]
impl Terminal for ProcessTerminal {
    fn enable_raw_mode(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn disable_raw_mode(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn read_unit(&mut self) -> io::Result<InputUnit> {
        use std::io::Read;

        let mut byte = [0u8; 1];
        loop {
            return match io::stdin().read(&mut byte) {
                Ok(0) => Ok(InputUnit::Eof),
                Ok(_) => Ok(InputUnit::Byte(byte[0])),
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => Err(err),
            };
        }
    }

    fn write(&mut self, data: &[u8]) -> io::Result<()> {
        use std::io::Write;

        let mut stdout = io::stdout();
        stdout.write_all(data)?;
        stdout.flush()
    }

    fn columns(&self) -> usize {
        DEFAULT_COLUMNS
    }

    fn rows(&self) -> usize {
        DEFAULT_ROWS
    }

    fn take_resize(&mut self) -> bool {
        false
    }

    fn input_kind(&self) -> InputKind {
        if is_unsupported_term(env::var("TERM").ok().as_deref()) {
            InputKind::Unsupported
        } else {
            InputKind::NotATty
        }
    }

    fn output_is_tty(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::is_unsupported_term;

    #[test]
    fn unsupported_terms_are_recognized() {
        assert!(is_unsupported_term(Some("dumb")));
        assert!(is_unsupported_term(Some("EMACS")));
        assert!(is_unsupported_term(Some("cons25")));
        assert!(!is_unsupported_term(Some("xterm-256color")));
        assert!(!is_unsupported_term(None));
    }
}
