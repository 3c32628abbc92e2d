//! SOAP response body fragments
//!
//! Every response the services emit is built here and wrapped in the
//! shared envelope by the dispatcher. Dynamic values are escaped before
//! interpolation; tokens and numeric fields come from typed state.

use crate::ServerConfig;
use camera_state::{DeviceIdentity, EventRecord, ImagingSettings, MediaProfile, PtzStatus};
use chrono::{DateTime, SecondsFormat, Utc};
use soap_codec::xml_escape;

/// UTC timestamp in the microsecond ISO form clients expect.
fn utc_stamp(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub const ABSOLUTE_MOVE_ACK: &str = "<tptz:AbsoluteMoveResponse/>";
pub const CONTINUOUS_MOVE_ACK: &str = "<tptz:ContinuousMoveResponse/>";
pub const STOP_ACK: &str = "<tptz:StopResponse/>";
pub const SET_IMAGING_ACK: &str = "<timg:SetImagingSettingsResponse/>";

pub fn capabilities(config: &ServerConfig) -> String {
    format!(
        r#"<tds:GetCapabilitiesResponse>
    <tds:Capabilities>
        <tt:Media>
            <tt:XAddr>{media}</tt:XAddr>
            <tt:StreamingCapabilities>
                <tt:RTPMulticast>false</tt:RTPMulticast>
                <tt:RTP_TCP>true</tt:RTP_TCP>
                <tt:RTP_RTSP_TCP>true</tt:RTP_RTSP_TCP>
            </tt:StreamingCapabilities>
        </tt:Media>
        <tt:Events>
            <tt:XAddr>{events}</tt:XAddr>
            <tt:WSSubscriptionPolicySupport>true</tt:WSSubscriptionPolicySupport>
            <tt:WSPullPointSupport>true</tt:WSPullPointSupport>
        </tt:Events>
        <tt:Imaging>
            <tt:XAddr>{imaging}</tt:XAddr>
        </tt:Imaging>
        <tt:PTZ>
            <tt:XAddr>{ptz}</tt:XAddr>
        </tt:PTZ>
    </tds:Capabilities>
</tds:GetCapabilitiesResponse>"#,
        media = xml_escape(&config.service_url("/onvif/media_service")),
        events = xml_escape(&config.service_url("/onvif/events_service")),
        imaging = xml_escape(&config.service_url("/onvif/imaging_service")),
        ptz = xml_escape(&config.service_url("/onvif/ptz_service")),
    )
}

pub fn device_information(identity: &DeviceIdentity) -> String {
    format!(
        r#"<tds:GetDeviceInformationResponse>
    <tds:Manufacturer>{}</tds:Manufacturer>
    <tds:Model>{}</tds:Model>
    <tds:FirmwareVersion>{}</tds:FirmwareVersion>
    <tds:SerialNumber>{}</tds:SerialNumber>
    <tds:HardwareId>{}</tds:HardwareId>
</tds:GetDeviceInformationResponse>"#,
        xml_escape(&identity.manufacturer),
        xml_escape(&identity.model),
        xml_escape(&identity.firmware_version),
        identity.serial,
        xml_escape(&identity.hardware_id),
    )
}

pub fn profiles(profile: &MediaProfile) -> String {
    let enc = &profile.encoder;
    format!(
        r#"<trt:GetProfilesResponse>
    <trt:Profiles token="{token}" fixed="true">
        <tt:Name>{name}</tt:Name>
        <tt:VideoSourceConfiguration token="{source}">
            <tt:Name>VideoSourceConfig</tt:Name>
            <tt:UseCount>1</tt:UseCount>
            <tt:SourceToken>{source}</tt:SourceToken>
            <tt:Bounds x="0" y="0" width="{width}" height="{height}"/>
        </tt:VideoSourceConfiguration>
        <tt:VideoEncoderConfiguration token="{encoder}">
            <tt:Name>VideoEncoder_H265</tt:Name>
            <tt:UseCount>1</tt:UseCount>
            <tt:Encoding>{encoding}</tt:Encoding>
            <tt:Resolution>
                <tt:Width>{width}</tt:Width>
                <tt:Height>{height}</tt:Height>
            </tt:Resolution>
            <tt:Quality>{quality}</tt:Quality>
            <tt:RateControl>
                <tt:FrameRateLimit>{framerate}</tt:FrameRateLimit>
                <tt:EncodingInterval>{interval}</tt:EncodingInterval>
                <tt:BitrateLimit>{bitrate}</tt:BitrateLimit>
            </tt:RateControl>
            <tt:Multicast>
                <tt:Address>
                    <tt:Type>IPv4</tt:Type>
                    <tt:IPv4Address>0.0.0.0</tt:IPv4Address>
                </tt:Address>
                <tt:Port>0</tt:Port>
                <tt:TTL>0</tt:TTL>
                <tt:AutoStart>false</tt:AutoStart>
            </tt:Multicast>
            <tt:SessionTimeout>{timeout}</tt:SessionTimeout>
        </tt:VideoEncoderConfiguration>
        <tt:PTZConfiguration token="{ptz_config}">
            <tt:Name>PTZConfig-1</tt:Name>
            <tt:UseCount>1</tt:UseCount>
            <tt:NodeToken>{ptz_node}</tt:NodeToken>
        </tt:PTZConfiguration>
    </trt:Profiles>
</trt:GetProfilesResponse>"#,
        token = xml_escape(profile.token),
        name = xml_escape(profile.name),
        source = xml_escape(profile.video_source),
        encoder = xml_escape(profile.video_encoder),
        encoding = xml_escape(enc.encoding),
        width = enc.width,
        height = enc.height,
        quality = enc.quality,
        framerate = enc.framerate_limit,
        interval = enc.encoding_interval,
        bitrate = enc.bitrate_limit,
        timeout = xml_escape(enc.session_timeout),
        ptz_config = xml_escape(profile.ptz_configuration),
        ptz_node = xml_escape(profile.ptz_node),
    )
}

pub fn stream_uri(uri: &str) -> String {
    format!(
        r#"<trt:GetStreamUriResponse>
    <trt:MediaUri>
        <tt:Uri>{}</tt:Uri>
        <tt:InvalidAfterConnect>false</tt:InvalidAfterConnect>
        <tt:InvalidAfterReboot>false</tt:InvalidAfterReboot>
        <tt:Timeout>PT60S</tt:Timeout>
    </trt:MediaUri>
</trt:GetStreamUriResponse>"#,
        xml_escape(uri),
    )
}

pub fn video_encoder_configurations(profile: &MediaProfile) -> String {
    let enc = &profile.encoder;
    format!(
        r#"<trt:GetVideoEncoderConfigurationsResponse>
    <trt:Configurations token="{token}">
        <tt:Name>VideoEncoder_H265</tt:Name>
        <tt:UseCount>1</tt:UseCount>
        <tt:Encoding>{encoding}</tt:Encoding>
        <tt:Resolution>
            <tt:Width>{width}</tt:Width>
            <tt:Height>{height}</tt:Height>
        </tt:Resolution>
        <tt:Quality>{quality}</tt:Quality>
        <tt:SessionTimeout>{timeout}</tt:SessionTimeout>
    </trt:Configurations>
</trt:GetVideoEncoderConfigurationsResponse>"#,
        token = xml_escape(profile.video_encoder),
        encoding = xml_escape(enc.encoding),
        width = enc.width,
        height = enc.height,
        quality = enc.quality,
        timeout = xml_escape(enc.session_timeout),
    )
}

pub fn ptz_nodes(profile: &MediaProfile) -> String {
    format!(
        r#"<tptz:GetNodesResponse>
    <tptz:PTZNode token="{token}">
        <tt:Name>PTZNode-1</tt:Name>
        <tt:SupportedPTZSpaces>
            <tt:AbsolutePanTiltPositionSpace>
                <tt:URI>http://www.onvif.org/ver10/tptz/PanTiltSpaces/PositionGenericSpace</tt:URI>
                <tt:XRange><tt:Min>-1.0</tt:Min><tt:Max>1.0</tt:Max></tt:XRange>
                <tt:YRange><tt:Min>-1.0</tt:Min><tt:Max>1.0</tt:Max></tt:YRange>
            </tt:AbsolutePanTiltPositionSpace>
            <tt:AbsoluteZoomPositionSpace>
                <tt:URI>http://www.onvif.org/ver10/tptz/ZoomSpaces/PositionGenericSpace</tt:URI>
                <tt:XRange><tt:Min>0.0</tt:Min><tt:Max>1.0</tt:Max></tt:XRange>
            </tt:AbsoluteZoomPositionSpace>
        </tt:SupportedPTZSpaces>
        <tt:MaximumNumberOfPresets>10</tt:MaximumNumberOfPresets>
        <tt:HomeSupported>true</tt:HomeSupported>
    </tptz:PTZNode>
</tptz:GetNodesResponse>"#,
        token = xml_escape(profile.ptz_node),
    )
}

pub fn ptz_configurations(profile: &MediaProfile) -> String {
    format!(
        r#"<tptz:GetConfigurationsResponse>
    <tptz:PTZConfiguration token="{token}">
        <tt:Name>PTZConfig-1</tt:Name>
        <tt:UseCount>1</tt:UseCount>
        <tt:NodeToken>{node}</tt:NodeToken>
    </tptz:PTZConfiguration>
</tptz:GetConfigurationsResponse>"#,
        token = xml_escape(profile.ptz_configuration),
        node = xml_escape(profile.ptz_node),
    )
}

pub fn ptz_status(status: &PtzStatus) -> String {
    let move_status = if status.moving { "MOVING" } else { "IDLE" };
    format!(
        r#"<tptz:GetStatusResponse>
    <tptz:PTZStatus>
        <tt:Position>
            <tt:PanTilt x="{pan}" y="{tilt}" space="http://www.onvif.org/ver10/tptz/PanTiltSpaces/PositionGenericSpace" />
            <tt:Zoom x="{zoom}" space="http://www.onvif.org/ver10/tptz/ZoomSpaces/PositionGenericSpace" />
        </tt:Position>
        <tt:MoveStatus>{move_status}</tt:MoveStatus>
        <tt:UtcTime>{time}</tt:UtcTime>
    </tptz:PTZStatus>
</tptz:GetStatusResponse>"#,
        pan = status.position.pan,
        tilt = status.position.tilt,
        zoom = status.position.zoom,
        move_status = move_status,
        time = utc_stamp(Utc::now()),
    )
}

pub fn imaging_settings(settings: &ImagingSettings) -> String {
    format!(
        r#"<timg:GetImagingSettingsResponse>
    <timg:ImagingSettings>
        <tt:Brightness>{}</tt:Brightness>
        <tt:Contrast>{}</tt:Contrast>
        <tt:Saturation>{}</tt:Saturation>
    </timg:ImagingSettings>
</timg:GetImagingSettingsResponse>"#,
        settings.brightness, settings.contrast, settings.saturation,
    )
}

pub fn pullpoint_subscription(config: &ServerConfig) -> String {
    let now = Utc::now();
    let termination = now + chrono::Duration::minutes(10);
    format!(
        r#"<tev:CreatePullPointSubscriptionResponse>
    <tev:SubscriptionReference>
        <wsa:Address>{address}</wsa:Address>
    </tev:SubscriptionReference>
    <wsnt:CurrentTime>{current}</wsnt:CurrentTime>
    <wsnt:TerminationTime>{termination}</wsnt:TerminationTime>
</tev:CreatePullPointSubscriptionResponse>"#,
        address = xml_escape(&config.service_url("/onvif/events/pullpoint")),
        current = utc_stamp(now),
        termination = utc_stamp(termination),
    )
}

pub fn pull_messages(events: &[EventRecord]) -> String {
    let mut notifications = String::new();
    for event in events {
        notifications.push_str(&format!(
            r#"
<wsnt:NotificationMessage>
    <wsnt:Topic Dialect="http://www.onvif.org/ver10/tev/topicExpression/ConcreteSet">{topic}</wsnt:Topic>
    <wsnt:Message><tt:Message UtcTime="{time}"><tt:Data><tt:SimpleItem Name="State" Value="{state}"/></tt:Data></tt:Message></wsnt:Message>
</wsnt:NotificationMessage>"#,
            topic = xml_escape(&event.topic),
            time = utc_stamp(event.time),
            state = event.state,
        ));
    }
    let now = Utc::now();
    format!(
        r#"<tev:PullMessagesResponse>
    <tev:CurrentTime>{current}</tev:CurrentTime>
    <tev:TerminationTime>{termination}</tev:TerminationTime>{notifications}
</tev:PullMessagesResponse>"#,
        current = utc_stamp(now),
        termination = utc_stamp(now + chrono::Duration::minutes(10)),
        notifications = notifications,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use camera_state::events::MOTION_TOPIC;
    use camera_state::PtzPosition;
    use chrono::TimeZone;

    fn test_config() -> ServerConfig {
        ServerConfig {
            ip: "192.0.2.10".into(),
            port: 8080,
            rtsp_url: String::new(),
        }
    }

    #[test]
    fn capabilities_lists_all_four_services() {
        let body = capabilities(&test_config());
        assert!(body.contains("http://192.0.2.10:8080/onvif/media_service"));
        assert!(body.contains("http://192.0.2.10:8080/onvif/events_service"));
        assert!(body.contains("http://192.0.2.10:8080/onvif/imaging_service"));
        assert!(body.contains("http://192.0.2.10:8080/onvif/ptz_service"));
        assert!(body.contains("<tt:WSPullPointSupport>true</tt:WSPullPointSupport>"));
    }

    #[test]
    fn capabilities_ptz_block_is_well_formed() {
        let body = capabilities(&test_config());
        let ptz_open = body.find("<tt:PTZ>").unwrap();
        let ptz_close = body.find("</tt:PTZ>").unwrap();
        assert!(ptz_open < ptz_close);
        // every tt:Media open has a matching close
        assert_eq!(body.matches("<tt:Media>").count(), body.matches("</tt:Media>").count());
    }

    #[test]
    fn device_information_escapes_markup() {
        let identity = DeviceIdentity {
            manufacturer: "ACME <&> Co".into(),
            model: "X-1".into(),
            firmware_version: "1.0.0".into(),
            hardware_id: "HW".into(),
            serial: uuid::Uuid::nil(),
        };
        let body = device_information(&identity);
        assert!(body.contains("ACME &lt;&amp;&gt; Co"));
        assert!(!body.contains("ACME <&> Co"));
        assert!(body.contains("<tds:SerialNumber>00000000-0000-0000-0000-000000000000</tds:SerialNumber>"));
    }

    #[test]
    fn profiles_carries_encoder_and_ptz_configuration() {
        let body = profiles(&MediaProfile::profile_t());
        assert!(body.contains(r#"<trt:Profiles token="Profile_T_1" fixed="true">"#));
        assert!(body.contains("<tt:Encoding>H265</tt:Encoding>"));
        assert!(body.contains("<tt:Width>1920</tt:Width>"));
        assert!(body.contains("<tt:BitrateLimit>4096</tt:BitrateLimit>"));
        assert!(body.contains("<tt:NodeToken>PTZNode_1</tt:NodeToken>"));
    }

    #[test]
    fn stream_uri_escapes_and_defaults_empty() {
        let body = stream_uri("");
        assert!(body.contains("<tt:Uri></tt:Uri>"));

        let body = stream_uri("rtsp://host/path?a=1&b=2");
        assert!(body.contains("rtsp://host/path?a=1&amp;b=2"));
    }

    #[test]
    fn ptz_status_reports_position_and_motion() {
        let status = PtzStatus {
            position: PtzPosition { pan: 0.5, tilt: -0.25, zoom: 0.75 },
            moving: true,
        };
        let body = ptz_status(&status);
        assert!(body.contains(r#"x="0.5" y="-0.25""#));
        assert!(body.contains(r#"<tt:Zoom x="0.75""#));
        assert!(body.contains("<tt:MoveStatus>MOVING</tt:MoveStatus>"));

        let body = ptz_status(&PtzStatus {
            position: PtzPosition { pan: 0.0, tilt: 0.0, zoom: 0.0 },
            moving: false,
        });
        assert!(body.contains("<tt:MoveStatus>IDLE</tt:MoveStatus>"));
    }

    #[test]
    fn pull_messages_renders_each_notification() {
        let time = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let events = vec![
            EventRecord { topic: MOTION_TOPIC.into(), time, state: true },
            EventRecord { topic: MOTION_TOPIC.into(), time, state: false },
        ];
        let body = pull_messages(&events);
        assert_eq!(body.matches("<wsnt:NotificationMessage>").count(), 2);
        assert!(body.contains(r#"<tt:SimpleItem Name="State" Value="true"/>"#));
        assert!(body.contains(r#"<tt:SimpleItem Name="State" Value="false"/>"#));
        assert!(body.contains("tns1:VideoSource/MotionAlarm"));
        assert!(body.contains(r#"UtcTime="2024-01-01T00:00:00.000000Z""#));
    }

    #[test]
    fn pull_messages_empty_queue_has_no_notifications() {
        let body = pull_messages(&[]);
        assert!(!body.contains("<wsnt:NotificationMessage>"));
        assert!(body.contains("<tev:CurrentTime>"));
        assert!(body.contains("<tev:TerminationTime>"));
    }

    #[test]
    fn subscription_points_at_pullpoint_endpoint() {
        let body = pullpoint_subscription(&test_config());
        assert!(body.contains("<wsa:Address>http://192.0.2.10:8080/onvif/events/pullpoint</wsa:Address>"));
        assert!(body.contains("<wsnt:CurrentTime>"));
        assert!(body.contains("<wsnt:TerminationTime>"));
    }
}
