pub mod process_frames_use_case;
