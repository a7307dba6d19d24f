use std::io::{self, BufWriter, Stdout, Write};
use std::os::unix::io::AsRawFd;
use std::sync::atomic::{AtomicBool, Ordering};

static RESIZE_REQUESTED: AtomicBool = AtomicBool::new(false);

extern "C" fn handle_sigwinch(_: libc::c_int) {
    RESIZE_REQUESTED.store(true, Ordering::Relaxed);
}

/// Raw-mode terminal on the alternate screen. Restored on drop.
pub struct Terminal {
    original_termios: libc::termios,
    out: BufWriter<Stdout>,
    pub rows: u16,
    pub cols: u16,
}

impl Terminal {
    pub fn new() -> io::Result<Self> {
        let stdin_fd = io::stdin().as_raw_fd();

        let mut original_termios: libc::termios = unsafe { std::mem::zeroed() };
        if unsafe { libc::tcgetattr(stdin_fd, &mut original_termios) } == -1 {
            return Err(io::Error::last_os_error());
        }

        let mut raw = original_termios;
        raw.c_iflag &= !(libc::BRKINT | libc::ICRNL | libc::INPCK | libc::ISTRIP | libc::IXON);
        raw.c_oflag &= !libc::OPOST;
        raw.c_cflag |= libc::CS8;
        raw.c_lflag &= !(libc::ECHO | libc::ICANON | libc::IEXTEN | libc::ISIG);
        // Reads return after 100ms without input so the loop can poll the backend.
        raw.c_cc[libc::VMIN] = 0;
        raw.c_cc[libc::VTIME] = 1;

        if unsafe { libc::tcsetattr(stdin_fd, libc::TCSAFLUSH, &raw) } == -1 {
            return Err(io::Error::last_os_error());
        }

        unsafe {
            let mut sa: libc::sigaction = std::mem::zeroed();
            sa.sa_sigaction = handle_sigwinch as libc::sighandler_t;
            libc::sigemptyset(&mut sa.sa_mask);
            sa.sa_flags = 0;
            libc::sigaction(libc::SIGWINCH, &sa, std::ptr::null_mut());
        }

        let (rows, cols) = window_size()?;

        let mut out = BufWriter::new(io::stdout());
        write!(out, "\x1b[?1049h\x1b[?25l")?;
        out.flush()?;

        Ok(Terminal {
            original_termios,
            out,
            rows,
            cols,
        })
    }

    /// Pick up a pending SIGWINCH. Returns true if the size changed.
    pub fn check_resize(&mut self) -> bool {
        if !RESIZE_REQUESTED.swap(false, Ordering::Relaxed) {
            return false;
        }
        match window_size() {
            Ok((rows, cols)) => {
                self.rows = rows;
                self.cols = cols;
                true
            }
            Err(_) => false,
        }
    }

    pub fn clear(&mut self) -> io::Result<()> {
        write!(self.out, "\x1b[2J\x1b[H")
    }

    pub fn move_to(&mut self, row: u16, col: u16) -> io::Result<()> {
        write!(self.out, "\x1b[{};{}H", row, col)
    }

    pub fn set_reverse(&mut self) -> io::Result<()> {
        write!(self.out, "\x1b[7m")
    }

    pub fn set_bold(&mut self) -> io::Result<()> {
        write!(self.out, "\x1b[1m")
    }

    /// Faint text; used for messages that have been read.
    pub fn set_dim(&mut self) -> io::Result<()> {
        write!(self.out, "\x1b[2m")
    }

    pub fn reset_attr(&mut self) -> io::Result<()> {
        write!(self.out, "\x1b[0m")
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    /// Write `s` cut to the screen width (at a char boundary).
    pub fn write_line(&mut self, s: &str) -> io::Result<()> {
        let max = self.cols as usize;
        let mut end = s.len().min(max);
        while end > 0 && !s.is_char_boundary(end) {
            end -= 1;
        }
        write!(self.out, "{}", &s[..end])
    }

    /// Reverse-video bar across the bottom row.
    pub fn status_bar(&mut self, text: &str) -> io::Result<()> {
        let width = self.cols as usize;
        self.move_to(self.rows, 1)?;
        self.set_reverse()?;
        let padded = format!("{:<width$}", text, width = width);
        self.write_line(&padded)?;
        self.reset_attr()
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = write!(self.out, "\x1b[0m\x1b[?25h\x1b[?1049l");
        let _ = self.out.flush();

        let stdin_fd = io::stdin().as_raw_fd();
        unsafe {
            libc::tcsetattr(stdin_fd, libc::TCSAFLUSH, &self.original_termios);
        }
    }
}

fn window_size() -> io::Result<(u16, u16)> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let fd = io::stdout().as_raw_fd();

    if unsafe { libc::ioctl(fd, libc::TIOCGWINSZ, &mut ws) } == -1 {
        return Err(io::Error::last_os_error());
    }

    Ok((ws.ws_row.max(4), ws.ws_col.max(20)))
}
